/// Component path resolution
///
/// Maps a component name like "quickjump" to `<root>/quickjump/store.json`,
/// creating the directory on the way.

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    file_name: String,
}

impl PathResolver {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            root: config.root.clone(),
            file_name: config.file_name.clone(),
        }
    }

    /// Resolve a component to its document path
    ///
    /// # Arguments
    /// * `component` - Logical namespace, e.g. "quickjump"
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Document path whose parent directory exists
    /// * `Err(StoreError::InvalidComponent)` - If the name has separators or odd characters
    /// * `Err(StoreError::PathResolution)` - If the directory cannot be created
    pub fn resolve(&self, component: &str) -> Result<PathBuf> {
        if !is_valid_component(component) {
            return Err(StoreError::InvalidComponent(component.to_string()));
        }

        let dir = self.root.join(component);
        fs::create_dir_all(&dir).map_err(|source| StoreError::PathResolution {
            path: dir.clone(),
            source,
        })?;

        Ok(dir.join(&self.file_name))
    }

    /// Config root all components live under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Plain names only, so a component can never point outside the root
fn is_valid_component(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
