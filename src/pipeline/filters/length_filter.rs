use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::{debug, info};

use crate::data_model::CleanedRecord;
use crate::error::{PipelineError, Result};
use crate::executor::{PipelineExecutor, ProcessingStep};
use crate::pipeline::token::{TokenCounter, TokenCounterStep};
use crate::utils::prometheus_metrics::RECORDS_FILTERED_TOTAL;

/// Rejects records whose cleaned text has `min_len` words or fewer.
pub struct WordLengthFilter {
    min_len: usize,
}

impl WordLengthFilter {
    pub fn new(min_len: usize) -> Self {
        WordLengthFilter { min_len }
    }
}

impl ProcessingStep for WordLengthFilter {
    fn name(&self) -> &'static str {
        "WordLengthFilter"
    }

    fn process(&self, record: CleanedRecord) -> Result<CleanedRecord> {
        if record.text_len <= self.min_len {
            return Err(PipelineError::DocumentFiltered {
                record_id: record.id,
                reason: format!("text_len {} <= {}", record.text_len, self.min_len),
            });
        }
        Ok(record)
    }
}

/// Rejects records above `max_len` tokens. Expects `token_len` to be filled by `TokenCounterStep`.
pub struct TokenLengthFilter {
    max_len: usize,
}

impl TokenLengthFilter {
    pub fn new(max_len: usize) -> Self {
        TokenLengthFilter { max_len }
    }
}

impl ProcessingStep for TokenLengthFilter {
    fn name(&self) -> &'static str {
        "TokenLengthFilter"
    }

    fn process(&self, record: CleanedRecord) -> Result<CleanedRecord> {
        let token_len = record.token_len.ok_or_else(|| {
            PipelineError::Unexpected(format!(
                "record {} has no token count; run the token counter first",
                record.id
            ))
        })?;
        if token_len > self.max_len {
            return Err(PipelineError::DocumentFiltered {
                record_id: record.id,
                reason: format!("token_len {} > {}", token_len, self.max_len),
            });
        }
        Ok(record)
    }
}

/// Runs `steps` over `records`, keeping the survivors in order.
pub fn filter_records(
    steps: Vec<Box<dyn ProcessingStep>>,
    records: Vec<CleanedRecord>,
    progress: Option<&ProgressBar>,
) -> Result<Vec<CleanedRecord>> {
    let executor = PipelineExecutor::new(steps);
    let before = records.len();
    let outcome = executor.run_partitioned(records, progress)?;

    for filtered in &outcome.filtered {
        debug!(
            record_id = filtered.record_id,
            step = %filtered.step_name,
            "Record filtered: {}",
            filtered.reason
        );
        RECORDS_FILTERED_TOTAL
            .with_label_values(&[filtered.step_name.as_str()])
            .inc();
    }
    info!(
        "{}: kept {} of {} records",
        executor.step_names().join(" -> "),
        outcome.kept.len(),
        before
    );
    Ok(outcome.kept)
}

/// Keeps records with strictly more than `min_len` words.
pub fn filter_by_word_length(
    records: Vec<CleanedRecord>,
    min_len: usize,
) -> Result<Vec<CleanedRecord>> {
    filter_records(vec![Box::new(WordLengthFilter::new(min_len))], records, None)
}

/// Counts tokens, then keeps records of at most `max_len` tokens. Survivors carry their `token_len`.
pub fn filter_by_token_length(
    records: Vec<CleanedRecord>,
    counter: Arc<dyn TokenCounter>,
    max_len: usize,
) -> Result<Vec<CleanedRecord>> {
    filter_records(
        vec![
            Box::new(TokenCounterStep::new(counter)),
            Box::new(TokenLengthFilter::new(max_len)),
        ],
        records,
        None,
    )
}
