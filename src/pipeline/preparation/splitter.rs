use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt::Debug;
use tracing::{debug, info, instrument};

use crate::data_model::{Dataset, SENTIMENT_COLUMN};
use crate::error::{PipelineError, Result};

fn check_fraction(test_fraction: f64) -> Result<()> {
    if test_fraction > 0.0 && test_fraction < 1.0 {
        Ok(())
    } else {
        Err(PipelineError::ConfigValidationError(format!(
            "test fraction must be strictly between 0.0 and 1.0, got {}",
            test_fraction
        )))
    }
}

/// Splits `items` into `(train, test)`, keeping per-class proportions.
///
/// Classes are visited in key order; each one is shuffled and
/// `round(count * test_fraction)` of its members (at least one, and never
/// all of them) go to test. Both partitions are shuffled again so classes
/// interleave. A class with fewer than two members cannot be split.
pub fn stratified_split<T, K, F>(
    items: Vec<T>,
    key: F,
    test_fraction: f64,
    rng: &mut StdRng,
) -> Result<(Vec<T>, Vec<T>)>
where
    K: Ord + Debug,
    F: Fn(&T) -> K,
{
    check_fraction(test_fraction)?;
    if items.is_empty() {
        return Err(PipelineError::EmptyPartition(
            "cannot split an empty set of records".to_string(),
        ));
    }

    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (class, mut members) in groups {
        let count = members.len();
        if count < 2 {
            return Err(PipelineError::EmptyPartition(format!(
                "class {:?} has {} member(s); stratified splitting needs at least 2",
                class, count
            )));
        }
        let n_test = ((count as f64 * test_fraction).round() as usize).clamp(1, count - 1);
        members.shuffle(rng);
        let class_train = members.split_off(n_test);
        debug!(class = ?class, train = class_train.len(), test = members.len(), "Class split");
        test.extend(members);
        train.extend(class_train);
    }

    train.shuffle(rng);
    test.shuffle(rng);
    Ok((train, test))
}

/// Stratified train/test split on the raw `Sentiment` label.
#[instrument(skip(dataset), fields(records = dataset.len()))]
pub fn split(dataset: Dataset, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !dataset.has_column(SENTIMENT_COLUMN) {
        return Err(PipelineError::SchemaError(format!(
            "dataset must contain a '{}' column for stratified splitting",
            SENTIMENT_COLUMN
        )));
    }
    let total = dataset.len();
    let columns = dataset.columns.clone();
    let mut rng = StdRng::seed_from_u64(seed);
    let (train, test) =
        stratified_split(dataset.records, |r| r.sentiment.clone(), test_fraction, &mut rng)?;

    info!(
        "Data split completed: train {} ({:.1}%), test {} ({:.1}%)",
        train.len(),
        train.len() as f64 / total as f64 * 100.0,
        test.len(),
        test.len() as f64 / total as f64 * 100.0
    );
    Ok((
        Dataset::new(columns.clone(), train),
        Dataset::new(columns, test),
    ))
}

/// Seeded full shuffle.
pub fn shuffle_records<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{Record, TEXT_COLUMN};
    use std::collections::{HashMap, HashSet};

    fn dataset(counts: &[(&str, usize)]) -> Dataset {
        let mut records = Vec::new();
        for (label, n) in counts {
            for _ in 0..*n {
                let id = records.len();
                records.push(Record {
                    id,
                    text: format!("post number {}", id),
                    sentiment: label.to_string(),
                    date: None,
                });
            }
        }
        Dataset::new(
            vec![TEXT_COLUMN.to_string(), SENTIMENT_COLUMN.to_string()],
            records,
        )
    }

    fn label_counts(dataset: &Dataset) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for r in &dataset.records {
            *counts.entry(r.sentiment.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_split_preserves_class_proportions() {
        let data = dataset(&[("Negative", 500), ("Neutral", 300), ("Positive", 200)]);
        let (train, test) = split(data, 0.2, 42).unwrap();
        let test_counts = label_counts(&test);
        let train_counts = label_counts(&train);
        assert_eq!(test_counts["Negative"], 100);
        assert_eq!(test_counts["Neutral"], 60);
        assert_eq!(test_counts["Positive"], 40);
        assert_eq!(train_counts["Negative"], 400);
        assert_eq!(train_counts["Neutral"], 240);
        assert_eq!(train_counts["Positive"], 160);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let data = dataset(&[("Negative", 17), ("Positive", 9)]);
        let (train, test) = split(data, 0.3, 7).unwrap();
        let train_ids: HashSet<usize> = train.records.iter().map(|r| r.id).collect();
        let test_ids: HashSet<usize> = test.records.iter().map(|r| r.id).collect();
        assert!(train_ids.is_disjoint(&test_ids));
        assert_eq!(train_ids.len() + test_ids.len(), 26);
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = split(dataset(&[("Negative", 40), ("Neutral", 25)]), 0.2, 42).unwrap();
        let b = split(dataset(&[("Negative", 40), ("Neutral", 25)]), 0.2, 42).unwrap();
        assert_eq!(a, b);
        let c = split(dataset(&[("Negative", 40), ("Neutral", 25)]), 0.2, 43).unwrap();
        assert_ne!(a.0.records, c.0.records);
    }

    #[test]
    fn test_split_requires_sentiment_column() {
        let mut data = dataset(&[("Negative", 4)]);
        data.columns = vec![TEXT_COLUMN.to_string()];
        assert!(matches!(split(data, 0.2, 42), Err(PipelineError::SchemaError(_))));
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        for fraction in [0.0, 1.0, -0.5, 1.5] {
            let data = dataset(&[("Negative", 10)]);
            assert!(matches!(
                split(data, fraction, 42),
                Err(PipelineError::ConfigValidationError(_))
            ));
        }
    }

    #[test]
    fn test_singleton_class_cannot_be_stratified() {
        let data = dataset(&[("Negative", 10), ("Positive", 1)]);
        assert!(matches!(split(data, 0.2, 42), Err(PipelineError::EmptyPartition(_))));
    }

    #[test]
    fn test_small_class_keeps_a_member_on_each_side() {
        let data = dataset(&[("Negative", 2), ("Positive", 3)]);
        let (train, test) = split(data, 0.1, 42).unwrap();
        assert_eq!(label_counts(&test)["Negative"], 1);
        assert_eq!(label_counts(&train)["Negative"], 1);
        assert_eq!(label_counts(&test)["Positive"], 1);
    }

    #[test]
    fn test_shuffle_records_is_seeded() {
        let items: Vec<usize> = (0..50).collect();
        let a = shuffle_records(items.clone(), 42);
        assert_eq!(a, shuffle_records(items.clone(), 42));
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }
}
