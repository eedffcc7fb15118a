pub mod seed;
pub mod sqlite;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use sqlite::SqliteCatalog;

/// Lowest difficulty tier.
pub const MIN_LEVEL: u8 = 1;
/// Highest difficulty tier.
pub const MAX_LEVEL: u8 = 6;

pub fn is_valid_level(level: u8) -> bool {
    (MIN_LEVEL..=MAX_LEVEL).contains(&level)
}

/// A vocabulary entry as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub word: String,
    pub definition: String,
    /// Part-of-speech tag, e.g. `n.`, `v.`, `adj.`
    pub pos: String,
    pub level: u8,
    pub example: Option<String>,
}

/// A vocabulary entry that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub word: String,
    pub definition: String,
    pub pos: String,
    pub level: u8,
    #[serde(default)]
    pub example: Option<String>,
}

/// Lifecycle of a catalog. Queries against an uninitialized catalog return
/// empty results; the session refuses to start a level until it is `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Uninitialized,
    Ready,
}

/// Read-only lookups the drill engine needs from a word store.
pub trait WordCatalog {
    fn state(&self) -> CatalogState;

    /// All words at `level`, any order.
    fn words_by_level(&self, level: u8) -> Vec<Word>;

    /// Random sample of words with the given part of speech and a level in
    /// `min_level..=max_level`, never including `exclude_id`.
    fn distractor_candidates(
        &self,
        pos: &str,
        min_level: u8,
        max_level: u8,
        exclude_id: i64,
        limit: usize,
    ) -> Vec<Word>;

    /// Random sample across the whole catalog, skipping every id in `exclude_ids`.
    fn random_words(&self, exclude_ids: &[i64], limit: usize) -> Vec<Word>;

    /// Number of words per level. Levels without words are absent.
    fn counts_by_level(&self) -> BTreeMap<u8, usize>;

    fn is_ready(&self) -> bool {
        self.state() == CatalogState::Ready
    }
}
