// src/pipeline/filters/mod.rs

mod length_filter;

pub use length_filter::{
    filter_by_token_length, filter_by_word_length, filter_records, TokenLengthFilter,
    WordLengthFilter,
};
