// src/pipeline/cleaners/mod.rs

mod text_cleaner;

pub use text_cleaner::{
    clean_hashtags, clean_text, filter_chars, remove_mult_spaces, strip_all_entities, strip_emoji,
    TextCleaner,
};
