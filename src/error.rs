//! Error types shared across the drill engine.

use thiserror::Error;

/// Failures opening or populating the word catalog.
///
/// Query-time problems never surface here: the catalog port degrades to empty
/// results instead. Only startup and import failures are reported.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("catalog io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid word list: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid starter word list: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("level {0} is outside 1..=6")]
    InvalidLevel(u8),

    #[error("entry {entry} has a blank {field}")]
    BlankField { entry: usize, field: &'static str },

    #[error("catalog has not been opened")]
    NotOpen,
}

/// Failures persisting or restoring learner progress.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("progress serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An imported snapshot was unparsable or inconsistent; nothing was applied.
    #[error("malformed progress snapshot: {0}")]
    MalformedSnapshot(String),
}

/// Failures of the per-turn drill cycle.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("word catalog is not loaded")]
    CatalogNotReady,

    #[error("level {0} is outside 1..=6")]
    InvalidLevel(u8),

    #[error("level {0} has no words")]
    EmptyLevel(u8),

    #[error("no question is active")]
    NoActiveQuestion,

    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// Failures of an interactive drill run.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Session(#[from] SessionError),
}
