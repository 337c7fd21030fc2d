/// Unity project registry (unitea)
///
/// Remembers Unity projects by name together with the editor version they
/// need. Launching the editor is left to the caller.

use crate::core::models::UnityProject;
use crate::core::project_detector::ProjectDetector;
use crate::core::records::{all_records, existing_record, get_record, put_record, validate_key};
use crate::error::{Result, StoreError};
use crate::store::{Change, DocumentStore, FileSystem, OsFileSystem};
use chrono::Utc;
use std::path::Path;

pub const COMPONENT: &str = "unitea";

pub struct Projects<F: FileSystem = OsFileSystem> {
    store: DocumentStore<F>,
}

impl<F: FileSystem> Projects<F> {
    pub fn new(store: DocumentStore<F>) -> Self {
        Self { store }
    }

    /// Register the Unity project containing `path`
    ///
    /// # Arguments
    /// * `path` - Any directory inside the project
    /// * `name` - Registry key; defaults to the project directory name
    ///
    /// # Returns
    /// * `Ok((name, project))` - The stored entry
    /// * `Err(StoreError::NotFound)` - If `path` is not inside a Unity project
    pub fn add(&mut self, path: &Path, name: Option<&str>) -> Result<(String, UnityProject)> {
        let root = ProjectDetector::detect(path)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => ProjectDetector::get_project_name(&root)
                .ok_or_else(|| StoreError::InvalidName(root.display().to_string()))?,
        };
        validate_key("project name", &name)?;

        let root_display = root.display().to_string();
        let editor_version = ProjectDetector::editor_version(&root);

        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let existing = existing_record::<UnityProject>(doc, &name);
            let mut project = existing.clone().unwrap_or(UnityProject {
                path: root_display.clone(),
                editor_version: None,
                open_count: 0,
                last_opened: None,
            });
            project.path = root_display.clone();
            project.editor_version = editor_version.clone();
            if existing.as_ref() == Some(&project) {
                return Ok::<_, StoreError>(Change::Unchanged);
            }
            put_record(doc, &name, &project)?;
            Ok(Change::Modified)
        })?;

        let project = get_record(&outcome.document, &name)?
            .ok_or_else(|| StoreError::NotFound(name.clone()))?;
        Ok((name, project))
    }

    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let outcome = self
            .store
            .mutate(COMPONENT, |doc| Change::from(doc.remove(name).is_some()))?;
        Ok(outcome.changed)
    }

    pub fn get(&mut self, name: &str) -> Result<Option<UnityProject>> {
        let doc = self.store.load(COMPONENT)?;
        get_record(&doc, name)
    }

    /// Most recently opened first; never-opened projects last, by name
    pub fn list(&mut self) -> Result<Vec<(String, UnityProject)>> {
        let doc = self.store.load(COMPONENT)?;
        let mut projects: Vec<(String, UnityProject)> = all_records(&doc);

        projects.sort_by(|(a_name, a), (b_name, b)| {
            b.last_opened
                .cmp(&a.last_opened)
                .then_with(|| a_name.cmp(b_name))
        });

        Ok(projects)
    }

    /// Record an open of `name`, refreshing its editor version from disk
    pub fn mark_opened(&mut self, name: &str) -> Result<UnityProject> {
        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let mut project = get_record::<UnityProject>(doc, name)?
                .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
            if let Some(version) = ProjectDetector::editor_version(&project.path) {
                project.editor_version = Some(version);
            }
            project.open_count += 1;
            project.last_opened = Some(Utc::now());
            put_record(doc, name, &project)?;
            Ok::<_, StoreError>(Change::Modified)
        })?;

        get_record(&outcome.document, name)?.ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::core::project_detector::tests::make_unity_project;
    use crate::store::document_store::tests::doc;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_projects(temp: &TempDir) -> Projects {
        Projects::new(DocumentStore::new(StoreConfig::new(temp.path().join("config"))))
    }

    #[test]
    fn test_add_detects_root_and_version() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("space-game");
        make_unity_project(&game, "2022.3.10f1");
        let scripts = game.join("Assets").join("Scripts");
        fs::create_dir_all(&scripts).unwrap();

        let mut projects = create_test_projects(&temp);
        let (name, project) = projects.add(&scripts, None).unwrap();

        assert_eq!(name, "space-game");
        assert_eq!(project.path, game.display().to_string());
        assert_eq!(project.editor_version.as_deref(), Some("2022.3.10f1"));
        assert_eq!(project.open_count, 0);
    }

    #[test]
    fn test_add_with_explicit_name() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("space-game");
        make_unity_project(&game, "2022.3.10f1");

        let mut projects = create_test_projects(&temp);
        let (name, _) = projects.add(&game, Some("sg")).unwrap();
        assert_eq!(name, "sg");
        assert!(projects.get("sg").unwrap().is_some());
    }

    #[test]
    fn test_add_outside_project_fails() {
        let temp = TempDir::new().unwrap();
        let mut projects = create_test_projects(&temp);

        assert!(matches!(
            projects.add(temp.path(), None),
            Err(StoreError::NotFound(_))
        ));
        assert!(projects.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_replaces_malformed_entry() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("game");
        make_unity_project(&game, "2022.3.10f1");

        let mut store = DocumentStore::new(StoreConfig::new(temp.path().join("config")));
        store.save(COMPONENT, &doc(json!({"game": {"openCount": "lots"}}))).unwrap();

        let mut projects = Projects::new(store);
        let (name, project) = projects.add(&game, None).unwrap();

        assert_eq!(name, "game");
        assert_eq!(project.open_count, 0);
        assert_eq!(project.editor_version.as_deref(), Some("2022.3.10f1"));
    }

    #[test]
    fn test_mark_opened_refreshes_version() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("game");
        make_unity_project(&game, "2021.3.1f1");

        let mut projects = create_test_projects(&temp);
        projects.add(&game, None).unwrap();

        // Project upgraded in the editor since it was registered
        make_unity_project(&game, "2022.3.10f1");
        let opened = projects.mark_opened("game").unwrap();

        assert_eq!(opened.open_count, 1);
        assert!(opened.last_opened.is_some());
        assert_eq!(opened.editor_version.as_deref(), Some("2022.3.10f1"));
    }

    #[test]
    fn test_list_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let mut projects = create_test_projects(&temp);
        for name in ["alpha", "beta", "gamma"] {
            let dir = temp.path().join(name);
            make_unity_project(&dir, "2022.3.10f1");
            projects.add(&dir, None).unwrap();
        }
        projects.mark_opened("beta").unwrap();

        let names: Vec<String> = projects.list().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_remove() {
        let temp = TempDir::new().unwrap();
        let game = temp.path().join("game");
        make_unity_project(&game, "2022.3.10f1");

        let mut projects = create_test_projects(&temp);
        projects.add(&game, None).unwrap();

        assert!(projects.remove("game").unwrap());
        assert!(!projects.remove("game").unwrap());
        assert!(matches!(projects.mark_opened("game"), Err(StoreError::NotFound(_))));
    }
}
