/// Project template registry (templater)
///
/// Names point at template archives on disk. Extracting an archive and
/// filling in its tokens happens elsewhere; this only remembers where
/// templates live and how often they are used.

use crate::core::models::Template;
use crate::core::records::{all_records, existing_record, get_record, put_record, validate_key};
use crate::error::{Result, StoreError};
use crate::store::{Change, DocumentStore, FileSystem, OsFileSystem};
use chrono::Utc;
use std::path::Path;

pub const COMPONENT: &str = "templater";

pub struct Templates<F: FileSystem = OsFileSystem> {
    store: DocumentStore<F>,
}

impl<F: FileSystem> Templates<F> {
    pub fn new(store: DocumentStore<F>) -> Self {
        Self { store }
    }

    /// Register or update the template `name`
    ///
    /// # Arguments
    /// * `name` - Key used on the command line
    /// * `archive` - Template archive location
    /// * `description` - Optional one-liner; `None` keeps the existing one
    pub fn register(
        &mut self,
        name: &str,
        archive: &Path,
        description: Option<&str>,
    ) -> Result<Template> {
        validate_key("template name", name)?;
        let archive = archive.display().to_string();

        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let existing = existing_record::<Template>(doc, name);
            let mut template = existing.clone().unwrap_or(Template {
                path: archive.clone(),
                description: None,
                use_count: 0,
                last_used: None,
            });
            template.path = archive.clone();
            if let Some(description) = description {
                template.description = Some(description.to_string());
            }
            if existing.as_ref() == Some(&template) {
                return Ok::<_, StoreError>(Change::Unchanged);
            }
            put_record(doc, name, &template)?;
            Ok(Change::Modified)
        })?;

        get_record(&outcome.document, name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let outcome = self
            .store
            .mutate(COMPONENT, |doc| Change::from(doc.remove(name).is_some()))?;
        Ok(outcome.changed)
    }

    pub fn get(&mut self, name: &str) -> Result<Option<Template>> {
        let doc = self.store.load(COMPONENT)?;
        get_record(&doc, name)
    }

    /// All templates by name
    pub fn list(&mut self) -> Result<Vec<(String, Template)>> {
        let doc = self.store.load(COMPONENT)?;
        // Document keys are already sorted
        Ok(all_records(&doc))
    }

    /// Record that `name` was deployed
    pub fn touch(&mut self, name: &str) -> Result<Template> {
        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let mut template = get_record::<Template>(doc, name)?
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
            template.use_count += 1;
            template.last_used = Some(Utc::now());
            put_record(doc, name, &template)?;
            Ok::<_, StoreError>(Change::Modified)
        })?;

        get_record(&outcome.document, name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}
