use crate::catalog::{is_valid_level, Word, WordCatalog, MIN_LEVEL};
use crate::distractors::DEFAULT_DISTRACTOR_COUNT;
use crate::error::SessionError;
use crate::evaluator::{correct_answer, evaluate};
use crate::progress::{LevelProgress, ProgressStorage, ProgressStore};
use crate::question::{Mode, Question, QuestionGenerator};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: Mode,
    pub distractor_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Cloze,
            distractor_count: DEFAULT_DISTRACTOR_COUNT,
        }
    }
}

/// Result of checking one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub correct: bool,
    pub word_id: i64,
    /// The drilled word, shown after a miss.
    pub word: String,
    /// The accepted answer: the word for cloze, the definition for quiz.
    pub answer: String,
    pub example: Option<String>,
}

/// One learner's drill session: level, word pool, current question and mode.
///
/// The turn cycle is `start_level` → `next_question` → `check_answer` →
/// `next_question` ... Each checked answer is recorded and flushed before
/// `check_answer` returns.
#[derive(Debug)]
pub struct Session<C: WordCatalog, S: ProgressStorage> {
    catalog: C,
    progress: ProgressStore<S>,
    config: SessionConfig,
    current_level: Option<u8>,
    level_words: Vec<Word>,
    current: Option<Question>,
}

impl<C: WordCatalog, S: ProgressStorage> Session<C, S> {
    pub fn new(catalog: C, progress: ProgressStore<S>, config: SessionConfig) -> Self {
        Self {
            catalog,
            progress,
            config,
            current_level: None,
            level_words: Vec::new(),
            current: None,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }

    /// Mutable access for snapshot import; the session itself only records attempts.
    pub fn progress_mut(&mut self) -> &mut ProgressStore<S> {
        &mut self.progress
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Switch question style. The level and its words are kept.
    pub fn set_mode(&mut self, mode: Mode) {
        self.config.mode = mode;
    }

    pub fn current_level(&self) -> Option<u8> {
        self.current_level
    }

    pub fn level_words(&self) -> &[Word] {
        &self.level_words
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    /// The level to resume: the last one played, or the first.
    pub fn resume_level(&self) -> u8 {
        self.progress
            .profile()
            .last_active_level
            .filter(|l| is_valid_level(*l))
            .unwrap_or(MIN_LEVEL)
    }

    /// Load the words of `level` and remember it as the last active level.
    pub fn start_level(&mut self, level: u8) -> Result<LevelProgress, SessionError> {
        if !is_valid_level(level) {
            return Err(SessionError::InvalidLevel(level));
        }
        if !self.catalog.is_ready() {
            return Err(SessionError::CatalogNotReady);
        }

        let words = self.catalog.words_by_level(level);
        if words.is_empty() {
            return Err(SessionError::EmptyLevel(level));
        }

        tracing::debug!(level, words = words.len(), "starting level");
        self.current_level = Some(level);
        self.level_words = words;
        self.current = None;
        self.progress.set_last_active_level(level)?;

        Ok(self.level_progress())
    }

    /// Generate the next question for the current level and mode.
    /// Returns `None` if no level with words has been started.
    pub fn next_question(&mut self) -> Option<&Question> {
        let generator = QuestionGenerator::new(&self.catalog)
            .with_distractor_count(self.config.distractor_count);
        self.current = generator.next(&self.level_words, self.config.mode);
        self.current.as_ref()
    }

    /// Check an answer to the current question and record the attempt.
    ///
    /// The question stays current until [`Session::next_question`] replaces it.
    pub fn check_answer(&mut self, input: &str) -> Result<Verdict, SessionError> {
        let question = self.current.as_ref().ok_or(SessionError::NoActiveQuestion)?;

        let correct = evaluate(question, input);
        let verdict = Verdict {
            correct,
            word_id: question.word_id(),
            word: question.word().to_string(),
            answer: correct_answer(question).to_string(),
            example: question.example().map(str::to_string),
        };

        self.progress.record_attempt(verdict.word_id, correct)?;
        Ok(verdict)
    }

    pub fn level_progress(&self) -> LevelProgress {
        self.progress.level_progress(&self.level_words)
    }

    pub fn counts_by_level(&self) -> BTreeMap<u8, usize> {
        self.catalog.counts_by_level()
    }
}
