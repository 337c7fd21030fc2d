/// Record types owned by the collaborators
///
/// The store treats records as opaque JSON; these are the shapes the
/// bookmark, template and project commands agree on. Field names are
/// camelCase on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bookmarked directory (component "quickjump")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub path: String,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl Bookmark {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            use_count: 0,
            last_used: None,
        }
    }
}

/// A registered project template archive (component "templater")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub use_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

/// A known Unity project (component "unitea")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnityProject {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_version: Option<String>,
    #[serde(default)]
    pub open_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened: Option<DateTime<Utc>>,
}
