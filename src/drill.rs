//! Line-oriented presentation of a drill session.
//!
//! Reads answers from any `BufRead` and writes prompts to any `Write`, so the
//! same loop drives the terminal and headless tests.

use crate::catalog::WordCatalog;
use crate::error::DrillError;
use crate::progress::ProgressStorage;
use crate::question::{Mode, Question};
use crate::session::{Session, Verdict};
use crossterm::style::{style, Stylize};
use rand::seq::SliceRandom;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

const PRAISES: &[&str] = &[
    "Excellent!",
    "Great Job!",
    "Awesome!",
    "Perfect!",
    "Superb!",
    "Well Done!",
    "Fantastic!",
    "You Rock!",
    "Brilliant!",
    "Keep it up!",
];

pub const QUIT: &str = ":q";
pub const TOGGLE_MODE: &str = ":m";

#[derive(Debug, Clone)]
pub struct DrillOptions {
    /// Pause after feedback before the next question
    pub feedback_delay: Duration,
    /// Stop after this many answers
    pub max_rounds: Option<usize>,
    pub color: bool,
}

impl Default for DrillOptions {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_millis(1500),
            max_rounds: None,
            color: true,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrillSummary {
    pub answered: usize,
    pub correct: usize,
}

/// What a line of learner input means for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Quit,
    ToggleMode,
    Answer(String),
    /// Input that cannot answer this question; prompt again.
    Invalid(String),
}

/// Interpret a line of input. Quiz questions take a 1-based option number,
/// which is forwarded as that option's text.
pub fn parse_reply(question: &Question, line: &str) -> Reply {
    let trimmed = line.trim();
    match trimmed {
        QUIT => return Reply::Quit,
        TOGGLE_MODE => return Reply::ToggleMode,
        "" => return Reply::Invalid("type an answer, :m to switch mode or :q to quit".to_string()),
        _ => {}
    }

    match question {
        Question::Cloze(_) => Reply::Answer(trimmed.to_string()),
        Question::Quiz(q) => match trimmed.parse::<usize>() {
            Ok(n) if (1..=q.options.len()).contains(&n) => Reply::Answer(q.options[n - 1].text.clone()),
            _ => Reply::Invalid(format!("choose an option from 1 to {}", q.options.len())),
        },
    }
}

/// Render a question as the lines shown to the learner.
pub fn render_question(question: &Question) -> String {
    match question {
        Question::Cloze(q) => {
            let mut out = format!("[{}] {}\n    {}\n", q.pos, q.definition, spaced(&q.masked_word));
            out.push_str("Type the full word: ");
            out
        }
        Question::Quiz(q) => {
            let mut out = format!("[{}] {}\n", q.pos, q.word);
            for (i, option) in q.options.iter().enumerate() {
                out.push_str(&format!("  {}) {}\n", i + 1, option.text));
            }
            out.push_str("Choose the correct one: ");
            out
        }
    }
}

fn spaced(masked: &str) -> String {
    let chars: Vec<String> = masked.chars().map(String::from).collect();
    chars.join(" ")
}

fn paint(text: &str, correct: bool, color: bool) -> String {
    match (color, correct) {
        (false, _) => text.to_string(),
        (true, true) => style(text).green().bold().to_string(),
        (true, false) => style(text).red().bold().to_string(),
    }
}

fn render_feedback(question: &Question, verdict: &Verdict, color: bool) -> String {
    if verdict.correct {
        let praise = PRAISES.choose(&mut rand::thread_rng()).copied().unwrap_or("Correct!");
        let mut out = paint(praise, true, color);
        if let Some(example) = &verdict.example {
            out.push_str(&format!("\n    {example}"));
        }
        out
    } else {
        let mut out = paint("Oops!", false, color);
        out.push_str(&format!(" The answer is: {}", verdict.word));
        if question.mode() == Mode::Quiz {
            out.push_str(&format!(" ({})", verdict.answer));
        }
        out
    }
}

/// Run question/answer turns until the learner quits, input ends, or
/// `max_rounds` answers have been given. The level must already be started.
pub fn run<C, S, R, W>(
    session: &mut Session<C, S>,
    mut input: R,
    out: &mut W,
    options: &DrillOptions,
) -> Result<DrillSummary, DrillError>
where
    C: WordCatalog,
    S: ProgressStorage,
    R: BufRead,
    W: Write,
{
    let mut summary = DrillSummary::default();
    let mut line = String::new();

    'questions: while options.max_rounds.map_or(true, |max| summary.answered < max) {
        let Some(question) = session.next_question().cloned() else {
            writeln!(out, "No words to practice.")?;
            break;
        };
        writeln!(out)?;
        write!(out, "{}", render_question(&question))?;
        out.flush()?;

        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break 'questions;
            }

            match parse_reply(&question, &line) {
                Reply::Quit => break 'questions,
                Reply::ToggleMode => {
                    session.set_mode(session.mode().toggled());
                    writeln!(out, "Switched to {} mode.", session.mode())?;
                    continue 'questions;
                }
                Reply::Invalid(hint) => {
                    write!(out, "{hint}: ")?;
                    out.flush()?;
                }
                Reply::Answer(answer) => {
                    let verdict = session.check_answer(&answer)?;
                    summary.answered += 1;
                    if verdict.correct {
                        summary.correct += 1;
                    }

                    writeln!(out, "{}", render_feedback(&question, &verdict, options.color))?;
                    let progress = session.level_progress();
                    writeln!(out, "Learned {} / {}", progress.learned, progress.total)?;
                    out.flush()?;

                    if !options.feedback_delay.is_zero() {
                        thread::sleep(options.feedback_delay);
                    }
                    continue 'questions;
                }
            }
        }
    }

    Ok(summary)
}
