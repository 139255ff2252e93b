// src/pipeline/token/mod.rs

mod token_counter;

pub use token_counter::{
    build_token_counter, PretrainedTokenCounter, TokenCounter, TokenCounterStep,
    WhitespaceTokenCounter,
};
