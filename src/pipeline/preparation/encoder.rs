use tracing::{debug, warn};

use crate::config::UnknownLabelPolicy;
use crate::data_model::{CleanedRecord, LabeledRecord, Sentiment};
use crate::error::{PipelineError, Result};
use crate::utils::prometheus_metrics::LABELS_DROPPED_TOTAL;

/// Maps raw labels onto the fixed `Sentiment` codes.
pub fn encode(
    records: Vec<CleanedRecord>,
    policy: UnknownLabelPolicy,
) -> Result<Vec<LabeledRecord>> {
    let mut labeled = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for record in records {
        match Sentiment::from_label(&record.sentiment) {
            Some(label) => labeled.push(LabeledRecord { record, label }),
            None => match policy {
                UnknownLabelPolicy::Fail => {
                    return Err(PipelineError::UnknownLabel {
                        label: record.sentiment,
                        record_id: record.id,
                    })
                }
                UnknownLabelPolicy::Drop => {
                    debug!(record_id = record.id, label = %record.sentiment, "Dropping unknown label");
                    dropped += 1;
                }
            },
        }
    }
    if dropped > 0 {
        warn!("Dropped {} records with unknown sentiment labels", dropped);
        LABELS_DROPPED_TOTAL.inc_by(dropped as f64);
    }
    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Record;

    fn record(id: usize, sentiment: &str) -> CleanedRecord {
        CleanedRecord::from_record(
            Record {
                id,
                text: "x".to_string(),
                sentiment: sentiment.to_string(),
                date: None,
            },
            "x".to_string(),
        )
    }

    #[test]
    fn test_known_labels_are_encoded() {
        let out = encode(
            vec![record(0, "Positive"), record(1, "Negative"), record(2, "Neutral")],
            UnknownLabelPolicy::Fail,
        )
        .unwrap();
        let codes: Vec<usize> = out.iter().map(|r| r.label.code()).collect();
        assert_eq!(codes, vec![2, 0, 1]);
        assert!(codes.iter().all(|c| *c <= 2));
    }

    #[test]
    fn test_unknown_label_fails_by_default() {
        let result = encode(
            vec![record(0, "Positive"), record(5, "Mixed")],
            UnknownLabelPolicy::default(),
        );
        match result {
            Err(PipelineError::UnknownLabel { label, record_id }) => {
                assert_eq!(label, "Mixed");
                assert_eq!(record_id, 5);
            }
            other => panic!("Expected UnknownLabel, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_policy_skips_unknown_and_empty() {
        let out = encode(
            vec![record(0, "Positive"), record(1, ""), record(2, "positive")],
            UnknownLabelPolicy::Drop,
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.id, 0);
    }
}
