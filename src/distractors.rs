use crate::catalog::{Word, WordCatalog, MAX_LEVEL, MIN_LEVEL};

/// Number of wrong options shown next to the correct definition.
pub const DEFAULT_DISTRACTOR_COUNT: usize = 2;

/// Pick up to `count` wrong answers for a quiz about `target`.
///
/// Words sharing the target's part of speech within one level of it are
/// preferred; any shortfall is topped up from the whole catalog. The result
/// never contains the target, repeats an id, or repeats the target's
/// definition text. It is shorter than `count` only when the catalog runs out.
/// Order is unspecified.
pub fn select_distractors<C: WordCatalog + ?Sized>(
    target: &Word,
    count: usize,
    catalog: &C,
) -> Vec<Word> {
    if count == 0 {
        return Vec::new();
    }

    let min_level = target.level.saturating_sub(1).max(MIN_LEVEL);
    let max_level = target.level.saturating_add(1).min(MAX_LEVEL);

    let mut chosen: Vec<Word> = Vec::with_capacity(count);
    // every id seen so far, accepted or not, so no draw can repeat it
    let mut seen: Vec<i64> = vec![target.id];
    let primary = catalog.distractor_candidates(&target.pos, min_level, max_level, target.id, count);
    push_distinct(&mut chosen, &mut seen, primary, target, count);

    if chosen.len() < count {
        tracing::debug!(
            "only {} same-pos distractors for {:?}, drawing the rest at random",
            chosen.len(),
            target.word
        );
    }

    while chosen.len() < count {
        let drawn = catalog.random_words(&seen, count - chosen.len());
        if drawn.is_empty() {
            break;
        }
        push_distinct(&mut chosen, &mut seen, drawn, target, count);
    }

    chosen
}

fn push_distinct(
    chosen: &mut Vec<Word>,
    seen: &mut Vec<i64>,
    candidates: Vec<Word>,
    target: &Word,
    count: usize,
) {
    for candidate in candidates {
        if chosen.len() >= count {
            break;
        }
        if !seen.contains(&candidate.id) {
            seen.push(candidate.id);
        }
        let duplicate = candidate.id == target.id
            || candidate.definition == target.definition
            || chosen
                .iter()
                .any(|w| w.id == candidate.id || w.definition == candidate.definition);
        if !duplicate {
            chosen.push(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sqlite::tests::{create_test_catalog, new_word};
    use crate::catalog::SqliteCatalog;
    use std::collections::HashSet;

    fn find(catalog: &SqliteCatalog, word: &str) -> Word {
        (MIN_LEVEL..=MAX_LEVEL)
            .flat_map(|level| catalog.words_by_level(level))
            .find(|w| w.word == word)
            .unwrap()
    }

    #[test]
    fn test_two_distractors_from_compatible_words() {
        let catalog = create_test_catalog();
        let cat = find(&catalog, "cat");

        for _ in 0..30 {
            let picked = select_distractors(&cat, 2, &catalog);
            assert_eq!(picked.len(), 2);
            assert!(picked.iter().all(|w| w.id != cat.id));
            assert!(picked.iter().all(|w| w.pos == "n."));
            assert_ne!(picked[0].id, picked[1].id);
        }
    }

    #[test]
    fn test_fallback_tops_up_from_whole_catalog() {
        let catalog = create_test_catalog();
        // the only other adjective is four levels away
        let serene = find(&catalog, "serene");

        for _ in 0..30 {
            let picked = select_distractors(&serene, 2, &catalog);
            assert_eq!(picked.len(), 2);
            let ids: HashSet<i64> = picked.iter().map(|w| w.id).collect();
            assert_eq!(ids.len(), 2);
            assert!(!ids.contains(&serene.id));
        }
    }

    #[test]
    fn test_level_window_is_clamped() {
        let catalog = create_test_catalog();
        let ubiquitous = find(&catalog, "ubiquitous");
        let picked = select_distractors(&ubiquitous, 2, &catalog);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|w| w.id != ubiquitous.id));
    }

    #[test]
    fn test_small_catalog_returns_what_exists() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_words(&[
                new_word("cat", "a small feline", "n.", 1),
                new_word("dog", "a loyal canine", "n.", 1),
            ])
            .unwrap();
        let cat = find(&catalog, "cat");

        let picked = select_distractors(&cat, 2, &catalog);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].word, "dog");
    }

    #[test]
    fn test_same_definition_is_never_a_distractor() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_words(&[
                new_word("big", "of great size", "adj.", 1),
                new_word("large", "of great size", "adj.", 1),
                new_word("tiny", "very small", "adj.", 1),
            ])
            .unwrap();
        let big = find(&catalog, "big");

        for _ in 0..20 {
            let picked = select_distractors(&big, 2, &catalog);
            assert_eq!(picked.len(), 1);
            assert_eq!(picked[0].word, "tiny");
        }
    }

    #[test]
    fn test_shared_definition_is_replaced_from_the_catalog() {
        let mut catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .insert_words(&[
                new_word("big", "of great size", "adj.", 1),
                new_word("huge", "very large", "adj.", 1),
                new_word("vast", "very large", "adj.", 1),
                new_word("run", "to move swiftly on foot", "v.", 5),
                new_word("eat", "to take in food", "v.", 5),
            ])
            .unwrap();
        let big = find(&catalog, "big");

        for _ in 0..100 {
            let picked = select_distractors(&big, 2, &catalog);
            assert_eq!(picked.len(), 2);
            assert_ne!(picked[0].definition, picked[1].definition);
            assert!(picked.iter().all(|w| w.id != big.id));
        }
    }

    #[test]
    fn test_zero_count() {
        let catalog = create_test_catalog();
        let cat = find(&catalog, "cat");
        assert!(select_distractors(&cat, 0, &catalog).is_empty());
    }

    #[test]
    fn test_uninitialized_catalog_yields_nothing() {
        let catalog = SqliteCatalog::uninitialized();
        let word = Word {
            id: 1,
            word: "cat".into(),
            definition: "feline".into(),
            pos: "n.".into(),
            level: 1,
            example: None,
        };
        assert!(select_distractors(&word, 2, &catalog).is_empty());
    }
}
