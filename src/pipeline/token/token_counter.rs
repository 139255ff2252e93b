use tokenizers::tokenizer::{Tokenizer, TruncationParams};
use tracing::info;

use crate::config::TokenizerConfig;
use crate::data_model::CleanedRecord;
use crate::error::{PipelineError, Result};
use crate::executor::ProcessingStep;
use std::sync::Arc;
use crate::utils::text::word_count;

/// Counts subword tokens, special tokens included, after truncation.
pub trait TokenCounter: Send + Sync {
    fn name(&self) -> &str;

    fn count_tokens(&self, text: &str) -> Result<usize>;
}

/// A Hugging Face tokenizer, truncating long inputs before counting.
pub struct PretrainedTokenCounter {
    name: String,
    tokenizer: Tokenizer,
}

impl PretrainedTokenCounter {
    pub fn new(tokenizer_name: &str, truncation: usize) -> Result<Self> {
        let mut tokenizer = Tokenizer::from_pretrained(tokenizer_name, None).map_err(|e| {
            PipelineError::TokenizerError(format!(
                "Error in loading tokenizer '{}': {}",
                tokenizer_name, e
            ))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: truncation,
                ..Default::default()
            }))
            .map_err(|e| PipelineError::TokenizerError(e.to_string()))?;
        Ok(PretrainedTokenCounter {
            name: tokenizer_name.to_string(),
            tokenizer,
        })
    }
}

impl TokenCounter for PretrainedTokenCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::TokenizerError(e.to_string()))?;
        Ok(encoding.get_tokens().len())
    }
}

/// One token per word plus the two special tokens, capped at the truncation length.
#[derive(Debug, Clone, Copy)]
pub struct WhitespaceTokenCounter {
    truncation: usize,
}

impl WhitespaceTokenCounter {
    pub fn new(truncation: usize) -> Self {
        WhitespaceTokenCounter { truncation }
    }
}

impl TokenCounter for WhitespaceTokenCounter {
    fn name(&self) -> &str {
        "whitespace"
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok((word_count(text) + 2).min(self.truncation))
    }
}

/// Fills `token_len` from the cleaned text. Never rejects.
pub struct TokenCounterStep {
    counter: Arc<dyn TokenCounter>,
}

impl TokenCounterStep {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        TokenCounterStep { counter }
    }
}

impl ProcessingStep for TokenCounterStep {
    fn name(&self) -> &'static str {
        "TokenCounter"
    }

    fn process(&self, mut record: CleanedRecord) -> Result<CleanedRecord> {
        record.token_len = Some(self.counter.count_tokens(&record.text_clean)?);
        Ok(record)
    }
}

/// Loads the counter the configuration names. Pretrained tokenizers may hit the network.
pub fn build_token_counter(config: &TokenizerConfig) -> Result<Arc<dyn TokenCounter>> {
    let counter: Arc<dyn TokenCounter> = match config {
        TokenizerConfig::Pretrained { name, truncation } => {
            info!("Loading pretrained tokenizer '{}'", name);
            Arc::new(PretrainedTokenCounter::new(name, *truncation)?)
        }
        TokenizerConfig::Whitespace { truncation } => {
            Arc::new(WhitespaceTokenCounter::new(*truncation))
        }
    };
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_counter_adds_special_tokens() {
        let counter = WhitespaceTokenCounter::new(512);
        assert_eq!(counter.count_tokens("").unwrap(), 2);
        assert_eq!(counter.count_tokens("hello big world").unwrap(), 5);
    }

    #[test]
    fn test_whitespace_counter_truncates() {
        let counter = WhitespaceTokenCounter::new(4);
        assert_eq!(counter.count_tokens("one two three four five").unwrap(), 4);
    }

    #[test]
    fn test_build_whitespace_counter() {
        let counter = build_token_counter(&TokenizerConfig::Whitespace { truncation: 512 }).unwrap();
        assert_eq!(counter.name(), "whitespace");
    }

    #[test]
    fn test_counter_step_annotates() {
        let step = TokenCounterStep::new(Arc::new(WhitespaceTokenCounter::new(512)));
        let record = CleanedRecord {
            id: 0,
            text: "Hi there".to_string(),
            sentiment: "Neutral".to_string(),
            date: None,
            text_clean: "hi there".to_string(),
            text_len: 2,
            token_len: None,
        };
        let out = step.process(record).unwrap();
        assert_eq!(out.token_len, Some(4));
        assert_eq!(out.text_clean, "hi there");
    }

    #[test]
    fn test_pretrained_counter_bert() {
        // This test requires internet access to download tokenizer model
        // and might be slow.
        let token_counter = PretrainedTokenCounter::new("bert-base-uncased", 512);

        if let Ok(counter) = token_counter {
            assert_eq!(counter.count_tokens("Hello, world! This is a test.").unwrap(), 11);
            assert_eq!(counter.count_tokens("").unwrap(), 2);
            let long_text = "word ".repeat(2000);
            assert_eq!(counter.count_tokens(&long_text).unwrap(), 512);
        } else {
            eprintln!(
                "Warning: Tokenizer 'bert-base-uncased' could not be loaded. Test skipped. Error: {:?}",
                token_counter.err()
            );
        }
    }

    #[test]
    fn test_unknown_tokenizer_is_an_error() {
        let result = PretrainedTokenCounter::new("this-model/does-not-exist-anywhere", 512);
        assert!(matches!(result, Err(PipelineError::TokenizerError(_))));
    }
}
