/// Shell commands built on the document store
///
/// Each feature area owns one component and its record shapes; all
/// read-modify-write goes through `DocumentStore::mutate`.

pub mod bookmarks;
pub mod models;
pub mod project_detector;
pub mod projects;
pub mod records;
pub mod templates;

pub use bookmarks::Bookmarks;
pub use models::{Bookmark, Template, UnityProject};
pub use project_detector::ProjectDetector;
pub use projects::Projects;
pub use templates::Templates;
