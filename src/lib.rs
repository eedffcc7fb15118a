// Library surface for the binary and for headless/integration tests.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod distractors;
pub mod drill;
pub mod error;
pub mod evaluator;
pub mod masking;
pub mod progress;
pub mod question;
pub mod session;

pub use catalog::{CatalogState, SqliteCatalog, Word, WordCatalog};
pub use error::{CatalogError, DrillError, ProgressError, SessionError};
pub use progress::{FileProgressStorage, LevelProgress, ProgressStore};
pub use question::{Mode, Question, QuestionGenerator};
pub use session::{Session, SessionConfig, Verdict};
