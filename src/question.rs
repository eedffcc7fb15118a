use crate::catalog::{Word, WordCatalog};
use crate::distractors::{select_distractors, DEFAULT_DISTRACTOR_COUNT};
use crate::masking::mask_word;
use clap::ValueEnum;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Question style used for the next turn.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Fill in the blanks of a masked word from its definition
    #[default]
    Cloze,
    /// Choose the right definition for a word
    Quiz,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Cloze => Mode::Quiz,
            Mode::Quiz => Mode::Cloze,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClozeQuestion {
    pub word_id: i64,
    pub masked_word: String,
    pub definition: String,
    pub pos: String,
    pub example: Option<String>,
    /// Answer key. Not meant for display while the question is open.
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOption {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    pub word_id: i64,
    pub word: String,
    pub pos: String,
    /// Shuffled; exactly one entry is correct.
    pub options: Vec<QuizOption>,
    pub example: Option<String>,
}

impl QuizQuestion {
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

/// One turn's challenge. Lives until the next question replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Question {
    Cloze(ClozeQuestion),
    Quiz(QuizQuestion),
}

impl Question {
    pub fn word_id(&self) -> i64 {
        match self {
            Question::Cloze(q) => q.word_id,
            Question::Quiz(q) => q.word_id,
        }
    }

    pub fn pos(&self) -> &str {
        match self {
            Question::Cloze(q) => &q.pos,
            Question::Quiz(q) => &q.pos,
        }
    }

    pub fn example(&self) -> Option<&str> {
        match self {
            Question::Cloze(q) => q.example.as_deref(),
            Question::Quiz(q) => q.example.as_deref(),
        }
    }

    /// The word being drilled.
    pub fn word(&self) -> &str {
        match self {
            Question::Cloze(q) => &q.word,
            Question::Quiz(q) => &q.word,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Question::Cloze(_) => Mode::Cloze,
            Question::Quiz(_) => Mode::Quiz,
        }
    }
}

/// Builds cloze and quiz questions from a pool of words.
pub struct QuestionGenerator<'a, C: WordCatalog + ?Sized> {
    catalog: &'a C,
    distractor_count: usize,
}

impl<'a, C: WordCatalog + ?Sized> QuestionGenerator<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self {
            catalog,
            distractor_count: DEFAULT_DISTRACTOR_COUNT,
        }
    }

    pub fn with_distractor_count(mut self, count: usize) -> Self {
        self.distractor_count = count;
        self
    }

    /// Pick a word uniformly at random from `pool` and build a question for it.
    /// Returns `None` for an empty pool.
    pub fn next(&self, pool: &[Word], mode: Mode) -> Option<Question> {
        let word = pool.choose(&mut rand::thread_rng())?;
        Some(self.build(word, mode))
    }

    /// Build a question for a specific word.
    pub fn build(&self, word: &Word, mode: Mode) -> Question {
        match mode {
            Mode::Cloze => Question::Cloze(cloze_question(word)),
            Mode::Quiz => Question::Quiz(self.quiz_question(word)),
        }
    }

    fn quiz_question(&self, word: &Word) -> QuizQuestion {
        let distractors = select_distractors(word, self.distractor_count, self.catalog);

        let mut options = Vec::with_capacity(distractors.len() + 1);
        options.push(QuizOption {
            text: word.definition.clone(),
            is_correct: true,
        });
        options.extend(distractors.into_iter().map(|d| QuizOption {
            text: d.definition,
            is_correct: false,
        }));
        options.shuffle(&mut rand::thread_rng());

        QuizQuestion {
            word_id: word.id,
            word: word.word.clone(),
            pos: word.pos.clone(),
            options,
            example: word.example.clone(),
        }
    }
}

fn cloze_question(word: &Word) -> ClozeQuestion {
    ClozeQuestion {
        word_id: word.id,
        masked_word: mask_word(&word.word),
        definition: word.definition.clone(),
        pos: word.pos.clone(),
        example: word.example.clone(),
        word: word.word.clone(),
    }
}
