/// Directory bookmarks (quickjump)
///
/// Aliases for directories the user jumps to often. Every jump bumps a
/// usage counter, so two shells jumping at once both have to count.

use crate::core::models::Bookmark;
use crate::core::records::{all_records, existing_record, get_record, put_record, validate_key};
use crate::error::{Result, StoreError};
use crate::store::{Change, DocumentStore, FileSystem, OsFileSystem};
use chrono::Utc;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::path::Path;

pub const COMPONENT: &str = "quickjump";

/// Handles bookmark storage and lookup
pub struct Bookmarks<F: FileSystem = OsFileSystem> {
    store: DocumentStore<F>,
    matcher: SkimMatcherV2,
}

impl<F: FileSystem> Bookmarks<F> {
    pub fn new(store: DocumentStore<F>) -> Self {
        Self {
            store,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Bookmark `path` as `alias`
    ///
    /// Re-adding an existing alias moves it to the new path but keeps its
    /// usage history.
    pub fn add(&mut self, alias: &str, path: &Path) -> Result<Bookmark> {
        validate_key("alias", alias)?;
        let path = path.display().to_string();

        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let mut bookmark = match existing_record::<Bookmark>(doc, alias) {
                Some(existing) if existing.path == path => {
                    return Ok::<_, StoreError>(Change::Unchanged);
                }
                Some(existing) => existing,
                None => Bookmark::new(path.clone()),
            };
            bookmark.path = path.clone();
            put_record(doc, alias, &bookmark)?;
            Ok(Change::Modified)
        })?;

        Ok(get_record(&outcome.document, alias)?.unwrap_or_else(|| Bookmark::new(path)))
    }

    /// Remove a bookmark. Returns whether it existed.
    pub fn remove(&mut self, alias: &str) -> Result<bool> {
        let outcome = self
            .store
            .mutate(COMPONENT, |doc| Change::from(doc.remove(alias).is_some()))?;
        Ok(outcome.changed)
    }

    pub fn get(&mut self, alias: &str) -> Result<Option<Bookmark>> {
        let doc = self.store.load(COMPONENT)?;
        get_record(&doc, alias)
    }

    /// All bookmarks, most used first, then by alias
    pub fn list(&mut self) -> Result<Vec<(String, Bookmark)>> {
        let doc = self.store.load(COMPONENT)?;
        let mut bookmarks: Vec<(String, Bookmark)> = all_records(&doc);

        bookmarks.sort_by(|(a_alias, a), (b_alias, b)| {
            b.use_count
                .cmp(&a.use_count)
                .then_with(|| a_alias.cmp(b_alias))
        });

        Ok(bookmarks)
    }

    /// Record a use of `alias`: bump the counter and the last-used time
    pub fn touch(&mut self, alias: &str) -> Result<Bookmark> {
        let outcome = self.store.try_mutate(COMPONENT, |doc| {
            let mut bookmark = get_record::<Bookmark>(doc, alias)?
                .ok_or_else(|| StoreError::NotFound(alias.to_string()))?;
            bookmark.use_count += 1;
            bookmark.last_used = Some(Utc::now());
            put_record(doc, alias, &bookmark)?;
            Ok::<_, StoreError>(Change::Modified)
        })?;

        get_record(&outcome.document, alias)?.ok_or_else(|| StoreError::NotFound(alias.to_string()))
    }

    /// Best bookmark for `query`
    ///
    /// An exact alias wins. Otherwise aliases and paths are fuzzy matched and
    /// the highest score wins, with usage count breaking ties.
    pub fn find(&mut self, query: &str) -> Result<Option<(String, Bookmark)>> {
        let bookmarks = self.list()?;

        if let Some(exact) = bookmarks.iter().find(|(alias, _)| alias == query) {
            return Ok(Some(exact.clone()));
        }

        let best = bookmarks
            .into_iter()
            .filter_map(|(alias, bookmark)| {
                let alias_score = self.matcher.fuzzy_match(&alias, query);
                let path_score = self.matcher.fuzzy_match(&bookmark.path, query);
                alias_score
                    .max(path_score)
                    .map(|score| (score, alias, bookmark))
            })
            .max_by(|(a_score, _, a), (b_score, _, b)| {
                a_score
                    .cmp(b_score)
                    .then_with(|| a.use_count.cmp(&b.use_count))
            })
            .map(|(_, alias, bookmark)| (alias, bookmark));

        Ok(best)
    }

    /// Find the best match for `query` and record the jump
    pub fn jump(&mut self, query: &str) -> Result<(String, Bookmark)> {
        let (alias, _) = self
            .find(query)?
            .ok_or_else(|| StoreError::NotFound(query.to_string()))?;
        let bookmark = self.touch(&alias)?;
        Ok((alias, bookmark))
    }
}
