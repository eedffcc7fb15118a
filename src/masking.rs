use rand::Rng;

/// Character shown in place of a hidden letter.
pub const BLANK: char = '_';

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Mask a word for a cloze question.
///
/// Every vowel is replaced with [`BLANK`]. If the word has three or fewer
/// characters, or fewer than two characters would remain visible, exactly one
/// random position is blanked instead so the puzzle stays solvable.
pub fn mask_word(word: &str) -> String {
    mask_word_with(word, &mut rand::thread_rng())
}

/// [`mask_word`] with an explicit random source.
pub fn mask_word_with<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    let chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return String::new();
    }

    let hidden = chars.iter().filter(|c| is_vowel(**c)).count();
    let visible = chars.len() - hidden;

    if chars.len() <= 3 || visible < 2 {
        let blank_at = rng.gen_range(0..chars.len());
        return chars
            .iter()
            .enumerate()
            .map(|(i, c)| if i == blank_at { BLANK } else { *c })
            .collect();
    }

    chars
        .iter()
        .map(|c| if is_vowel(*c) { BLANK } else { *c })
        .collect()
}
