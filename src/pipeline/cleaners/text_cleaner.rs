use once_cell::sync::Lazy;
use regex::Regex;

use crate::data_model::CleanedRecord;
use crate::error::Result;
use crate::executor::ProcessingStep;
use crate::utils::text::{is_emoji, is_space, trim_space, word_count, BANNED_CHARS};

// `\S` with the 0x1C..=0x1F separators counted as whitespace.
static LINK_OR_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:@|https?://)[^\s\x1C-\x1F]+").unwrap());

/// Drops every emoji and pictograph code point.
pub fn strip_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

/// Removes line breaks, links, mentions, non-ASCII characters and punctuation, and lowercases.
pub fn strip_all_entities(text: &str) -> String {
    let text = text.replace('\r', "").replace('\n', " ").to_lowercase();
    let text = LINK_OR_MENTION.replace_all(&text, "");
    text.chars()
        .filter(|c| c.is_ascii() && !BANNED_CHARS.contains(c))
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_tag_char(c: char) -> bool {
    is_word_char(c) || c == '-'
}

/// Index one past the tag starting at `start`.
fn scan_tag(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && is_tag_char(chars[end]) {
        end += 1;
    }
    end
}

/// `#hashtag` followed by a word boundary is never a trailing tag.
fn is_exempt_tag(chars: &[char], hash: usize) -> bool {
    const LITERAL: &[char] = &['h', 'a', 's', 'h', 't', 'a', 'g'];
    let after = hash + 1 + LITERAL.len();
    chars.len() >= after
        && &chars[hash + 1..after] == LITERAL
        && chars.get(after).map_or(true, |c| !is_word_char(*c))
}

/// True when only whitespace-separated `#tag`s, then optional whitespace, follow `pos`.
fn only_tags_remain(chars: &[char], mut pos: usize) -> bool {
    loop {
        let mut next = pos;
        while next < chars.len() && is_space(chars[next]) {
            next += 1;
        }
        if next == chars.len() {
            return true;
        }
        if next == pos || chars[next] != '#' {
            return false;
        }
        let tag_end = scan_tag(chars, next + 1);
        if tag_end == next + 1 {
            return false;
        }
        pos = tag_end;
    }
}

/// Splits `text` around its trailing hashtags, left to right, without overlap.
fn split_trailing_tags(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '#' && !is_exempt_tag(&chars, i) {
            let tag_end = scan_tag(&chars, i + 1);
            if tag_end > i + 1 && only_tags_remain(&chars, tag_end) {
                pieces.push(chars[piece_start..i].iter().collect());
                piece_start = tag_end;
                i = tag_end;
                continue;
            }
        }
        i += 1;
    }
    pieces.push(chars[piece_start..].iter().collect());
    pieces
}

/// Removes hashtags trailing the text and unwraps the rest: `#` and `_` become word breaks.
pub fn clean_hashtags(text: &str) -> String {
    let joined = split_trailing_tags(text)
        .iter()
        .map(|piece| trim_space(piece))
        .collect::<Vec<_>>()
        .join(" ");
    joined
        .split(['#', '_'])
        .map(trim_space)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Blanks every space-separated token containing `$` or `&`.
pub fn filter_chars(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.contains('$') || word.contains('&') {
                ""
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses each run of two or more whitespace characters into one space.
pub fn remove_mult_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if is_space(c) && chars.peek().is_some_and(|n| is_space(*n)) {
            while chars.peek().is_some_and(|n| is_space(*n)) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// The full cleaning chain, in its fixed order.
pub fn clean_text(text: &str) -> String {
    let cleaned = strip_emoji(text);
    let cleaned = strip_all_entities(&cleaned);
    let cleaned = clean_hashtags(&cleaned);
    let cleaned = filter_chars(&cleaned);
    remove_mult_spaces(&cleaned)
}

/// Fills `text_clean` and `text_len` from the raw text. Never rejects.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        TextCleaner
    }
}

impl ProcessingStep for TextCleaner {
    fn name(&self) -> &'static str {
        "TextCleaner"
    }

    fn process(&self, mut record: CleanedRecord) -> Result<CleanedRecord> {
        record.text_clean = clean_text(&record.text);
        record.text_len = word_count(&record.text_clean);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Record;

    #[test]
    fn test_links_mentions_and_punctuation_are_removed() {
        let cleaned = clean_text("Check this out! http://x.co/abc @john #great #hashtag");
        assert!(!cleaned.contains("http"));
        assert!(!cleaned.contains("john"));
        assert!(!cleaned.contains('#'));
        assert!(!cleaned.contains('!'));
        assert_eq!(cleaned, "check this out great hashtag");
    }

    #[test]
    fn test_emoji_are_removed() {
        assert_eq!(clean_text("great day 😊🎉"), "great day");
        assert_eq!(strip_emoji("a👍🏽b"), "ab");
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(clean_text("Multiple   spaces\nhere"), "multiple spaces here");
        assert_eq!(remove_mult_spaces("a \t\u{1f}b c"), "a b c");
        assert_eq!(remove_mult_spaces(" a"), " a");
    }

    #[test]
    fn test_currency_and_ampersands() {
        assert_eq!(clean_text("I love $$$ this & that"), "i love this that");
        assert_eq!(filter_chars("pay $5 now & later"), "pay  now  later");
        assert_eq!(filter_chars("r&d rocks"), " rocks");
    }

    #[test]
    fn test_strip_all_entities() {
        assert_eq!(strip_all_entities("Hi\r\n@Bob: see https://t.co/x!"), "hi  see ");
        assert_eq!(strip_all_entities("café Ã±"), "caf ");
        assert_eq!(strip_all_entities("no_under-score"), "nounderscore");
    }

    #[test]
    fn test_hashtag_literal_is_never_trailing() {
        assert_eq!(clean_hashtags("good vibes #hashtag"), "good vibes hashtag");
        assert!(clean_hashtags("good vibes #hashtag").contains("hashtag"));
        // A longer word is an ordinary tag.
        assert_eq!(clean_hashtags("good vibes #hashtags"), "good vibes");
        assert_eq!(clean_hashtags("a #great #hashtag"), "a hashtag");
    }

    #[test]
    fn test_trailing_hashtags_are_removed() {
        assert_eq!(clean_hashtags("good vibes #great #day"), "good vibes");
        assert_eq!(clean_hashtags("#only #tags"), "");
        assert_eq!(clean_hashtags("end #tag-with-dash  "), "end");
    }

    #[test]
    fn test_inner_hashtags_are_unwrapped() {
        assert_eq!(clean_hashtags("love #rust_lang today"), "love rust lang today");
        assert_eq!(clean_hashtags("#first then text"), " first then text");
        assert_eq!(clean_hashtags("tag #one! #two"), "tag one!");
    }

    #[test]
    fn test_cleaning_is_idempotent_on_clean_text() {
        for raw in ["So #blessed today!!", "RT @user: vote NOW http://a.b/c", "  padded   "] {
            let once = clean_text(raw);
            assert_eq!(clean_text(&once), once);
        }
    }

    #[test]
    fn test_cleaned_text_holds_only_ascii_lowercase() {
        let cleaned = clean_text("Ünïcode — “quotes” AND CAPS §¼");
        assert!(cleaned.is_ascii());
        assert_eq!(cleaned, cleaned.to_lowercase());
        assert!(!cleaned.contains("  "));
    }

    #[test]
    fn test_text_cleaner_step_fills_fields() {
        let record = CleanedRecord::from(Record {
            id: 3,
            text: "Big NEWS today!! 🎉".to_string(),
            sentiment: "Positive".to_string(),
            date: None,
        });
        let out = TextCleaner::new().process(record).unwrap();
        assert_eq!(out.text_clean, "big news today");
        assert_eq!(out.text_len, 3);
        assert_eq!(out.text, "Big NEWS today!! 🎉");
    }
}
