use crate::data_model::CleanedRecord;
use crate::error::{PipelineError, Result};
use indicatif::ProgressBar;
use tracing::{debug, warn};

/// A per-record stage. Steps reject a record by returning
/// `PipelineError::DocumentFiltered`; any other error aborts the batch.
pub trait ProcessingStep: Send + Sync {
    fn name(&self) -> &'static str; // For logging/error reporting

    fn process(&self, record: CleanedRecord) -> Result<CleanedRecord>;
}

/// A record some step rejected, with the step's reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredRecord {
    pub record_id: usize,
    pub step_name: String,
    pub reason: String,
}

/// Survivors and rejections of one batch, survivors in input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub kept: Vec<CleanedRecord>,
    pub filtered: Vec<FilteredRecord>,
}

pub struct PipelineExecutor {
    pub(crate) steps: Vec<Box<dyn ProcessingStep>>, // Holds the ordered steps
}

impl PipelineExecutor {
    pub fn new(steps: Vec<Box<dyn ProcessingStep>>) -> Self {
        if steps.is_empty() {
            warn!("Pipeline created with no steps.");
        }
        PipelineExecutor { steps }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Runs every step over one record, wrapping failures with the step name.
    pub fn run_single(&self, initial_record: CleanedRecord) -> Result<CleanedRecord> {
        let mut current = initial_record;
        for step in &self.steps {
            debug!(record_id = current.id, "Running step: {}", step.name());
            current = step
                .process(current)
                .map_err(|e| PipelineError::StepError {
                    step_name: step.name().to_string(),
                    source: Box::new(e),
                })?;
        }
        Ok(current)
    }

    pub fn run_batch(&self, records: Vec<CleanedRecord>) -> Vec<Result<CleanedRecord>> {
        records.into_iter().map(|r| self.run_single(r)).collect()
    }

    /// Runs a batch and splits it into survivors and rejections.
    /// The first error that is not a rejection aborts the whole batch.
    pub fn run_partitioned(
        &self,
        records: Vec<CleanedRecord>,
        progress: Option<&ProgressBar>,
    ) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome {
            kept: Vec::with_capacity(records.len()),
            filtered: Vec::new(),
        };

        for record in records {
            let result = self.run_single(record);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            match result {
                Ok(record) => outcome.kept.push(record),
                Err(PipelineError::StepError { step_name, source }) => match *source {
                    PipelineError::DocumentFiltered { record_id, reason } => {
                        outcome.filtered.push(FilteredRecord {
                            record_id,
                            step_name,
                            reason,
                        })
                    }
                    other => {
                        return Err(PipelineError::StepError {
                            step_name,
                            source: Box::new(other),
                        })
                    }
                },
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }
}
