// Utils

pub mod common;
pub mod prometheus_metrics;
pub mod stats;
pub mod text;

pub use text::{
    is_emoji, is_space, split_words, top_words, trim_space, word_count, BANNED_CHARS,
};
