use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "vocadrill";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// SQLite word catalog.
    pub fn catalog_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("vocab.db"))
            .unwrap_or_else(|| PathBuf::from("vocab.db"))
    }

    /// Learner progress blob.
    pub fn progress_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("progress.json"))
            .unwrap_or_else(|| PathBuf::from("vocab_progress.json"))
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("vocadrill_config.json"))
    }
}
