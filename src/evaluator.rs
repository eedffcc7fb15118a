use crate::question::Question;

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Decide whether `input` answers `question`.
///
/// For cloze questions `input` is the learner's typed word, compared with the
/// target after trimming and lower-casing; partial answers never count.
/// For quiz questions `input` is the text of the selected option and must
/// equal the text of the option flagged correct.
pub fn evaluate(question: &Question, input: &str) -> bool {
    match question {
        Question::Cloze(q) => normalize(input) == normalize(&q.word),
        Question::Quiz(q) => q
            .correct_option()
            .is_some_and(|option| option.text == input),
    }
}

/// The text that would have been accepted, for feedback after a miss.
pub fn correct_answer(question: &Question) -> &str {
    match question {
        Question::Cloze(q) => &q.word,
        Question::Quiz(q) => q
            .correct_option()
            .map(|o| o.text.as_str())
            .unwrap_or(q.word.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{ClozeQuestion, QuizOption, QuizQuestion};

    fn cloze(word: &str) -> Question {
        Question::Cloze(ClozeQuestion {
            word_id: 1,
            masked_word: crate::masking::mask_word(word),
            definition: "a small feline".to_string(),
            pos: "n.".to_string(),
            example: None,
            word: word.to_string(),
        })
    }

    fn quiz() -> Question {
        Question::Quiz(QuizQuestion {
            word_id: 2,
            word: "brave".to_string(),
            pos: "adj.".to_string(),
            options: vec![
                QuizOption {
                    text: "very small".to_string(),
                    is_correct: false,
                },
                QuizOption {
                    text: "ready to face danger".to_string(),
                    is_correct: true,
                },
                QuizOption {
                    text: "easily broken".to_string(),
                    is_correct: false,
                },
            ],
            example: Some("The brave firefighter saved the dog.".to_string()),
        })
    }

    #[test]
    fn test_cloze_exact_match() {
        assert!(evaluate(&cloze("cat"), "cat"));
        assert!(!evaluate(&cloze("cat"), "cut"));
    }

    #[test]
    fn test_cloze_normalizes_whitespace_and_case() {
        let q = cloze("cat");
        assert_eq!(evaluate(&q, " Cat "), evaluate(&q, "cat"));
        assert!(evaluate(&q, "\tCAT\n"));
        assert!(evaluate(&cloze("Paris"), "paris"));
    }

    #[test]
    fn test_cloze_rejects_partial_answers() {
        let q = cloze("umbrella");
        assert!(!evaluate(&q, "uea"));
        assert!(!evaluate(&q, "umbrell"));
        assert!(!evaluate(&q, "um brella"));
        assert!(!evaluate(&q, ""));
    }

    #[test]
    fn test_quiz_matches_correct_option_text() {
        let q = quiz();
        assert!(evaluate(&q, "ready to face danger"));
        assert!(!evaluate(&q, "very small"));
        assert!(!evaluate(&q, "brave"));
    }

    #[test]
    fn test_quiz_without_correct_option_never_passes() {
        let Question::Quiz(mut inner) = quiz() else {
            unreachable!()
        };
        inner.options.iter_mut().for_each(|o| o.is_correct = false);
        assert!(!evaluate(&Question::Quiz(inner), "ready to face danger"));
    }

    #[test]
    fn test_correct_answer() {
        assert_eq!(correct_answer(&cloze("cat")), "cat");
        assert_eq!(correct_answer(&quiz()), "ready to face danger");
    }
}
