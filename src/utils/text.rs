// Text utils

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Inclusive code point ranges treated as emoji or pictographs.
/// The ranges overlap; membership is a plain union test.
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map symbols
    (0x1F1E0, 0x1F1FF), // flags (iOS)
    (0x2500, 0x2BEF),
    (0x2702, 0x27B0),
    (0x24C2, 0x1F251),
    (0x1F926, 0x1F937),
    (0x10000, 0x10FFFF),
    (0x200D, 0x200D), // zero width joiner
    (0x2640, 0x2642),
    (0x2600, 0x2B55),
    (0x23CF, 0x23CF),
    (0x23E9, 0x23E9),
    (0x231A, 0x231A),
    (0x3030, 0x3030),
];

pub fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| cp >= start && cp <= end)
}

/// ASCII punctuation, the same 32 characters as Python's `string.punctuation`.
pub const ASCII_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Characters left behind by UTF-8 text decoded as Latin-1. Stripped one by one, never decoded.
pub const MOJIBAKE_ARTIFACTS: &str = "Ã±ã¼â»§";

/// Everything the entity strip deletes after the non-ASCII pass.
pub static BANNED_CHARS: Lazy<HashSet<char>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.extend(ASCII_PUNCTUATION.chars());
    set.extend(MOJIBAKE_ARTIFACTS.chars());
    set
});

/// Whitespace as Python's `str.isspace` sees it: Unicode White_Space plus the
/// ASCII information separators 0x1C..=0x1F.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

/// Trim with the same whitespace notion as `is_space`.
pub fn trim_space(text: &str) -> &str {
    text.trim_matches(is_space)
}

/// Words separated by runs of whitespace, ignoring leading and trailing runs.
pub fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_space).filter(|w| !w.is_empty())
}

pub fn word_count(text: &str) -> usize {
    split_words(text).count()
}

/// Most frequent words across `texts`, ties broken alphabetically.
pub fn top_words<'a, I>(texts: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for text in texts {
        for word in split_words(text) {
            *counts.entry(word).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n);
    ranked
}
