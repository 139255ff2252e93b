use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::data_model::{ClassDistribution, LabeledRecord, PreparedData, Sentiment};
use crate::error::{PipelineError, Result};
use crate::pipeline::preparation::stratified_split;
use crate::utils::prometheus_metrics::RECORDS_OVERSAMPLED_TOTAL;

/// Random oversampling: every class is topped up to the majority count with
/// copies drawn uniformly, with replacement, from its own members.
///
/// Output is the input in order, then the copies grouped per class in code order.
#[instrument(skip(records), fields(records = records.len()))]
pub fn balance(records: Vec<LabeledRecord>, seed: u64) -> Result<Vec<LabeledRecord>> {
    if records.is_empty() {
        return Err(PipelineError::EmptyPartition(
            "cannot balance an empty training partition".to_string(),
        ));
    }

    let mut members: [Vec<usize>; 3] = Default::default();
    for (idx, r) in records.iter().enumerate() {
        members[r.label.code()].push(idx);
    }
    let majority = members.iter().map(Vec::len).max().unwrap_or(0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut extra = Vec::new();
    for class in Sentiment::ALL {
        let pool = &members[class.code()];
        if pool.len() == majority {
            continue;
        }
        if pool.is_empty() {
            return Err(PipelineError::EmptyPartition(format!(
                "class {} has no training records to oversample",
                class
            )));
        }
        for _ in 0..majority - pool.len() {
            let pick = pool[rng.gen_range(0..pool.len())];
            extra.push(records[pick].clone());
        }
    }

    info!(
        "Oversampled {} records; every class now has {}",
        extra.len(),
        majority
    );
    RECORDS_OVERSAMPLED_TOTAL.inc_by(extra.len() as f64);
    let mut balanced = records;
    balanced.extend(extra);
    Ok(balanced)
}

fn unzip(records: Vec<LabeledRecord>) -> (Vec<String>, Vec<Sentiment>) {
    records
        .into_iter()
        .map(|r| (r.record.text_clean, r.label))
        .unzip()
}

/// Balances train, carves a stratified validation slice from the balanced pool,
/// and flattens everything into classifier inputs.
pub fn prepare_for_training(
    train: Vec<LabeledRecord>,
    test: Vec<LabeledRecord>,
    config: &PipelineConfig,
) -> Result<PreparedData> {
    let distribution_before = ClassDistribution::from_labels(train.iter().map(|r| r.label));
    let balanced = balance(train, config.seed)?;
    let distribution_after = ClassDistribution::from_labels(balanced.iter().map(|r| r.label));

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, valid) =
        stratified_split(balanced, |r| r.label, config.validation_fraction, &mut rng)?;

    let (x_train, y_train) = unzip(train);
    let (x_valid, y_valid) = unzip(valid);
    let (x_test, y_test) = unzip(test);
    info!(
        "Training data: {}, validation data: {}, testing data: {}",
        x_train.len(),
        x_valid.len(),
        x_test.len()
    );

    Ok(PreparedData {
        x_train,
        y_train,
        x_valid,
        y_valid,
        x_test,
        y_test,
        distribution_before,
        distribution_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{CleanedRecord, Record};

    fn labeled(id: usize, label: Sentiment) -> LabeledRecord {
        let record = CleanedRecord::from_record(
            Record {
                id,
                text: format!("raw {}", id),
                sentiment: label.label().to_string(),
                date: None,
            },
            format!("clean text {}", id),
        );
        LabeledRecord { record, label }
    }

    fn records(counts: [usize; 3]) -> Vec<LabeledRecord> {
        let mut out = Vec::new();
        for class in Sentiment::ALL {
            for _ in 0..counts[class.code()] {
                let id = out.len();
                out.push(labeled(id, class));
            }
        }
        out
    }

    #[test]
    fn test_balance_equalises_classes() {
        let balanced = balance(records([400, 240, 160]), 42).unwrap();
        let dist = ClassDistribution::from_labels(balanced.iter().map(|r| r.label));
        assert_eq!(dist.0, [400, 400, 400]);
    }

    #[test]
    fn test_balance_keeps_originals_first_then_groups_copies() {
        let input = records([5, 2, 3]);
        let balanced = balance(input.clone(), 42).unwrap();
        assert_eq!(&balanced[..10], &input[..]);
        let copies: Vec<Sentiment> = balanced[10..].iter().map(|r| r.label).collect();
        assert_eq!(
            copies,
            vec![
                Sentiment::Neutral,
                Sentiment::Neutral,
                Sentiment::Neutral,
                Sentiment::Positive,
                Sentiment::Positive
            ]
        );
        // Copies are byte-for-byte duplicates of existing members.
        for copy in &balanced[10..] {
            assert!(input.contains(copy));
        }
    }

    #[test]
    fn test_balance_is_deterministic() {
        let a = balance(records([9, 3, 1]), 7).unwrap();
        let b = balance(records([9, 3, 1]), 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_balance_errors() {
        assert!(matches!(balance(vec![], 42), Err(PipelineError::EmptyPartition(_))));
        assert!(matches!(
            balance(records([3, 0, 2]), 42),
            Err(PipelineError::EmptyPartition(_))
        ));
    }

    #[test]
    fn test_already_balanced_input_is_unchanged() {
        let input = records([4, 4, 4]);
        assert_eq!(balance(input.clone(), 42).unwrap(), input);
    }

    #[test]
    fn test_prepare_for_training_carves_validation() {
        let config = PipelineConfig::default();
        let test = records([10, 6, 4]);
        let prepared = prepare_for_training(records([400, 240, 160]), test, &config).unwrap();

        assert_eq!(prepared.distribution_before.0, [400, 240, 160]);
        assert_eq!(prepared.distribution_after.0, [400, 400, 400]);
        assert_eq!(prepared.x_valid.len(), 120);
        assert_eq!(prepared.x_train.len(), 1080);
        assert_eq!(prepared.x_train.len(), prepared.y_train.len());
        let valid = ClassDistribution::from_labels(prepared.y_valid.iter().copied());
        assert_eq!(valid.0, [40, 40, 40]);
        assert_eq!(prepared.x_test.len(), 20);
        assert_eq!(prepared.x_test[0], "clean text 0");
    }
}
