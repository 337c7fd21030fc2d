/// Unity project detection
///
/// Finds the root of a Unity project by walking up from a directory until
/// it sees `Assets/` next to `ProjectSettings/ProjectVersion.txt`, and reads
/// the editor version the project was last saved with.

use crate::error::{Result, StoreError};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const ASSETS_DIR: &str = "Assets";
const PROJECT_VERSION_FILE: &str = "ProjectSettings/ProjectVersion.txt";

// e.g. "m_EditorVersion: 2022.3.10f1"
const EDITOR_VERSION_PATTERN: &str = r"(?m)^m_EditorVersion:\s*(\S+)\s*$";

/// Handles Unity project root detection
pub struct ProjectDetector;

impl ProjectDetector {
    /// Detect the Unity project containing `start_path`
    ///
    /// # Arguments
    /// * `start_path` - The path to start searching from (usually cwd)
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - The project root
    /// * `Err(StoreError::NotFound)` - If no parent directory is a Unity project
    ///
    /// # Examples
    /// ```no_run
    /// use shelldock_lib::core::ProjectDetector;
    /// use std::env;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let cwd = env::current_dir()?;
    /// let project_root = ProjectDetector::detect(&cwd)?;
    /// println!("Unity project: {}", project_root.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn detect<P: AsRef<Path>>(start_path: P) -> Result<PathBuf> {
        let start_path = start_path.as_ref();

        // Ensure the path is absolute
        let absolute_path = if start_path.is_absolute() {
            start_path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| StoreError::io(start_path, e))?
                .join(start_path)
        };

        absolute_path
            .ancestors()
            .find(|dir| Self::is_unity_project(dir))
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                StoreError::NotFound(format!("Unity project at {}", absolute_path.display()))
            })
    }

    pub fn is_unity_project<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        path.join(ASSETS_DIR).is_dir() && path.join(PROJECT_VERSION_FILE).is_file()
    }

    /// Editor version from `ProjectSettings/ProjectVersion.txt`, if readable
    pub fn editor_version<P: AsRef<Path>>(project_root: P) -> Option<String> {
        let content = fs::read_to_string(project_root.as_ref().join(PROJECT_VERSION_FILE)).ok()?;
        parse_editor_version(&content)
    }

    /// Uses the directory name as the project name
    pub fn get_project_name<P: AsRef<Path>>(project_root: P) -> Option<String> {
        project_root
            .as_ref()
            .file_name()
            .and_then(|name| name.to_str())
            .map(|s| s.to_string())
    }
}

fn parse_editor_version(content: &str) -> Option<String> {
    let regex = Regex::new(EDITOR_VERSION_PATTERN).ok()?;
    regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
