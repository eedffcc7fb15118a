use crate::catalog::Word;
use crate::error::ProgressError;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Per-word practice record.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordStat {
    pub attempts: u64,
    pub correct: u64,
    /// Unix epoch milliseconds of the latest attempt.
    pub last_review: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub last_active_level: Option<u8>,
    pub total_correct: u64,
    pub total_attempts: u64,
}

/// Everything that survives a restart. Serialized as the progress snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedState {
    pub user_profile: UserProfile,
    /// Keyed by word id; JSON object keys are the id as a string.
    pub word_stats: BTreeMap<i64, WordStat>,
}

impl PersistedState {
    /// Check that every stat has `correct <= attempts` and that the profile
    /// totals are the sums over all stats.
    pub fn validate(&self) -> Result<(), String> {
        if let Some((id, _)) = self.word_stats.iter().find(|(_, s)| s.correct > s.attempts) {
            return Err(format!("word {id} has more correct answers than attempts"));
        }

        let (attempts, correct) = self
            .word_stats
            .values()
            .try_fold((0u64, 0u64), |(attempts, correct), s| {
                Some((attempts.checked_add(s.attempts)?, correct.checked_add(s.correct)?))
            })
            .ok_or_else(|| "word stat totals overflow".to_string())?;
        let profile = &self.user_profile;
        if profile.total_attempts != attempts || profile.total_correct != correct {
            return Err(format!(
                "profile totals {}/{} disagree with word stats {}/{}",
                profile.total_correct, profile.total_attempts, correct, attempts
            ));
        }

        Ok(())
    }
}

/// Learned versus total words for a set of words.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    pub learned: usize,
    pub total: usize,
}

/// Where the progress blob lives between runs.
pub trait ProgressStorage {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> io::Result<Option<Vec<u8>>>;
    fn save(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Set aside a blob that could not be read so the next save does not
    /// destroy it.
    fn preserve(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }
}

/// Progress blob kept in a single JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileProgressStorage {
    path: PathBuf,
}

impl FileProgressStorage {
    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Where an unreadable progress file is copied before it is replaced.
    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".bak");
        PathBuf::from(path)
    }
}

impl ProgressStorage for FileProgressStorage {
    fn load(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(bytes)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn preserve(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.backup_path(), bytes)
    }
}

/// In-process storage, for hosts that handle durability themselves.
#[derive(Debug, Default, Clone)]
pub struct MemoryProgressStorage {
    blob: Option<Vec<u8>>,
    preserved: Option<Vec<u8>>,
}

impl MemoryProgressStorage {
    pub fn with_blob(bytes: Vec<u8>) -> Self {
        Self {
            blob: Some(bytes),
            preserved: None,
        }
    }

    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    pub fn preserved(&self) -> Option<&[u8]> {
        self.preserved.as_deref()
    }
}

impl ProgressStorage for MemoryProgressStorage {
    fn load(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.blob = Some(bytes.to_vec());
        Ok(())
    }

    fn preserve(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.preserved = Some(bytes.to_vec());
        Ok(())
    }
}

/// Name for an exported snapshot taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("my_vocab_progress_{}.json", date.format("%Y-%m-%d"))
}

/// Owner of the learner's persisted statistics.
///
/// Every mutation writes the full state back to storage before returning.
#[derive(Debug)]
pub struct ProgressStore<S: ProgressStorage> {
    storage: S,
    state: PersistedState,
}

impl<S: ProgressStorage> ProgressStore<S> {
    /// Load saved progress, starting fresh if none exists or it cannot be read.
    /// An unreadable blob is handed to [`ProgressStorage::preserve`] first.
    pub fn open(mut storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    match storage.preserve(&bytes) {
                        Ok(()) => tracing::error!("set aside unreadable progress, starting fresh: {e}"),
                        Err(io) => tracing::error!(
                            "unreadable progress will be overwritten, backup failed ({io}): {e}"
                        ),
                    }
                    PersistedState::default()
                }
            },
            Ok(None) => PersistedState::default(),
            Err(e) => {
                tracing::warn!("could not load progress: {e}");
                PersistedState::default()
            }
        };

        Self { storage, state }
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn profile(&self) -> &UserProfile {
        &self.state.user_profile
    }

    pub fn word_stat(&self, word_id: i64) -> Option<&WordStat> {
        self.state.word_stats.get(&word_id)
    }

    pub fn word_stats(&self) -> &BTreeMap<i64, WordStat> {
        &self.state.word_stats
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Share of correct answers over all attempts, if any were made.
    pub fn accuracy(&self) -> Option<f64> {
        let profile = &self.state.user_profile;
        match profile.total_attempts {
            0 => None,
            attempts => Some(profile.total_correct as f64 / attempts as f64 * 100.0),
        }
    }

    /// Count one answer for `word_id` and update the profile totals.
    pub fn record_attempt(&mut self, word_id: i64, is_correct: bool) -> Result<(), ProgressError> {
        let stat = self.state.word_stats.entry(word_id).or_default();
        stat.attempts += 1;
        if is_correct {
            stat.correct += 1;
        }
        stat.last_review = Utc::now().timestamp_millis();

        let profile = &mut self.state.user_profile;
        profile.total_attempts += 1;
        if is_correct {
            profile.total_correct += 1;
        }

        tracing::debug!(word_id, is_correct, "recorded attempt");
        self.flush()
    }

    pub fn set_last_active_level(&mut self, level: u8) -> Result<(), ProgressError> {
        self.state.user_profile.last_active_level = Some(level);
        self.flush()
    }

    /// A word counts as learned once it has been answered correctly at least once.
    pub fn level_progress(&self, words: &[Word]) -> LevelProgress {
        let learned = words
            .iter()
            .filter(|w| self.word_stat(w.id).is_some_and(|s| s.correct > 0))
            .count();

        LevelProgress {
            learned,
            total: words.len(),
        }
    }

    pub fn export_snapshot(&self) -> Result<Vec<u8>, ProgressError> {
        Ok(serde_json::to_vec_pretty(&self.state)?)
    }

    /// Write a snapshot into `dir` under today's export name.
    pub fn export_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf, ProgressError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(export_file_name(Utc::now().date_naive()));
        fs::write(&path, self.export_snapshot()?)?;
        Ok(path)
    }

    /// Replace all progress with a previously exported snapshot.
    ///
    /// The snapshot must carry both `user_profile` and `word_stats` and be
    /// internally consistent. On any failure the current progress is kept.
    pub fn import_snapshot(&mut self, bytes: &[u8]) -> Result<(), ProgressError> {
        let imported = decode(bytes)?;
        self.storage.save(&serde_json::to_vec(&imported)?)?;
        self.state = imported;
        tracing::debug!(words = self.state.word_stats.len(), "imported progress snapshot");
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ProgressError> {
        let bytes = serde_json::to_vec(&self.state)?;
        self.storage.save(&bytes)?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<PersistedState, ProgressError> {
    let state: PersistedState = serde_json::from_slice(bytes)
        .map_err(|e| ProgressError::MalformedSnapshot(e.to_string()))?;
    state.validate().map_err(ProgressError::MalformedSnapshot)?;
    Ok(state)
}
