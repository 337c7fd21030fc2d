/// Typed access to opaque document records
///
/// Helpers shared by the collaborators for turning document entries into
/// their record structs and back.

use crate::error::{Result, StoreError};
use crate::store::Document;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Decode the record stored under `key`, if any
pub fn get_record<T: DeserializeOwned>(doc: &Document, key: &str) -> Result<Option<T>> {
    doc.get(key)
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}

/// Record under `key` that is about to be overwritten
///
/// A malformed entry counts as absent so that re-adding the key repairs it.
pub fn existing_record<T: DeserializeOwned>(doc: &Document, key: &str) -> Option<T> {
    match get_record(doc, key) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Replacing malformed entry {:?}: {}", key, e);
            None
        }
    }
}

pub fn put_record<T: Serialize>(doc: &mut Document, key: &str, record: &T) -> Result<()> {
    doc.insert(key.to_string(), serde_json::to_value(record)?);
    Ok(())
}

/// Every record that decodes as `T`. Entries that don't are skipped with a warning.
pub fn all_records<T: DeserializeOwned>(doc: &Document) -> Vec<(String, T)> {
    doc.iter()
        .filter_map(|(key, value)| match serde_json::from_value(value.clone()) {
            Ok(record) => Some((key.clone(), record)),
            Err(e) => {
                tracing::warn!("Skipping malformed entry {:?}: {}", key, e);
                None
            }
        })
        .collect()
}

/// Aliases and names: letters, digits, `.`, `_` and `-`
pub fn validate_key(kind: &str, key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidName(format!(
            "{} {:?} may only contain letters, digits, '.', '_' and '-'",
            kind, key
        )))
    }
}
