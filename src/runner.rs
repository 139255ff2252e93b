// src/runner.rs

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, info_span, instrument};

use crate::classifier::{evaluate, EvaluationMetrics, TextClassifier, TfidfNaiveBayes};
use crate::config::PipelineConfig;
use crate::data_model::{CleanedRecord, PreparedData, Record, Sentiment};
use crate::error::Result;
use crate::executor::PipelineExecutor;
use crate::pipeline::cleaners::TextCleaner;
use crate::pipeline::filters::{filter_records, TokenLengthFilter, WordLengthFilter};
use crate::pipeline::preparation::{
    deduplicate_by_text, encode, prepare_for_training, shuffle_records, split,
};
use crate::pipeline::readers::{BaseReader, CsvReader};
use crate::pipeline::token::{TokenCounter, TokenCounterStep};
use crate::utils::common::record_progress_bar;
use crate::utils::prometheus_metrics::{PIPELINE_DURATION_SECONDS, PIPELINE_RUNS_TOTAL};
use crate::utils::stats::LengthStats;

/// Train and test counts at one point of the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionSizes {
    pub train: usize,
    pub test: usize,
}

impl PartitionSizes {
    fn of<A, B>(train: &[A], test: &[B]) -> Self {
        PartitionSizes {
            train: train.len(),
            test: test.len(),
        }
    }
}

/// Everything one pipeline run produced, for the report and the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub total_records: usize,
    pub columns: Vec<String>,
    /// Raw label counts over the whole input, before any filtering.
    pub raw_label_counts: BTreeMap<String, usize>,
    pub initial: PartitionSizes,
    pub duplicates_removed: usize,
    pub after_word_filter: PartitionSizes,
    pub after_token_filter: PartitionSizes,
    /// Longest token count seen per partition, before outlier removal.
    pub max_token_len: PartitionSizes,
    pub train_records: Vec<CleanedRecord>,
    pub test_records: Vec<CleanedRecord>,
    pub train_length_stats: LengthStats,
    pub test_length_stats: LengthStats,
    pub prepared: PreparedData,
    pub predictions: Vec<Sentiment>,
    pub metrics: EvaluationMetrics,
    pub tokenizer: String,
}

impl PipelineRun {
    pub fn train_size_after_oversampling(&self) -> usize {
        self.prepared.distribution_after.total()
    }
}

fn clean_partition(
    records: Vec<Record>,
    show_progress: bool,
    label: &str,
) -> Result<Vec<CleanedRecord>> {
    let pb = record_progress_bar(show_progress, records.len(), label);
    let executor = PipelineExecutor::new(vec![Box::new(TextCleaner::new())]);
    let pending = records.into_iter().map(CleanedRecord::from).collect();
    let outcome = executor.run_partitioned(pending, Some(&pb))?;
    pb.finish_with_message(format!("{} done", label));
    Ok(outcome.kept)
}

fn count_tokens(
    records: Vec<CleanedRecord>,
    counter: &Arc<dyn TokenCounter>,
    show_progress: bool,
    label: &str,
) -> Result<Vec<CleanedRecord>> {
    let pb = record_progress_bar(show_progress, records.len(), label);
    let executor = PipelineExecutor::new(vec![Box::new(TokenCounterStep::new(counter.clone()))]);
    let outcome = executor.run_partitioned(records, Some(&pb))?;
    pb.finish_with_message(format!("{} done", label));
    Ok(outcome.kept)
}

fn longest_token_count(records: &[CleanedRecord]) -> usize {
    records.iter().filter_map(|r| r.token_len).max().unwrap_or(0)
}

fn length_stats(records: &[CleanedRecord]) -> LengthStats {
    let lengths: Vec<usize> = records.iter().map(|r| r.text_len).collect();
    LengthStats::from_lengths(&lengths)
}

/// Load, split, dedup, clean, filter, encode, balance, train and evaluate.
#[instrument(skip_all, fields(input = %config.input.path.display(), tokenizer = counter.name()))]
pub fn run_pipeline(
    config: &PipelineConfig,
    counter: Arc<dyn TokenCounter>,
) -> Result<PipelineRun> {
    let timer = PIPELINE_DURATION_SECONDS.start_timer();

    let dataset = CsvReader::new(config.input.clone()).read_dataset()?;
    let total_records = dataset.len();
    let columns = dataset.columns.clone();
    let mut raw_label_counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in &dataset.records {
        *raw_label_counts.entry(r.sentiment.clone()).or_insert(0) += 1;
    }

    let (train, test) = split(dataset, config.data_test_size, config.seed)?;
    let initial = PartitionSizes::of(&train.records, &test.records);

    let train_records = deduplicate_by_text(train.records);
    let duplicates_removed = initial.train - train_records.len();

    let (train_clean, test_clean) = {
        let _span = info_span!("clean").entered();
        (
            clean_partition(train_records, config.show_progress, "Cleaning training texts")?,
            clean_partition(test.records, config.show_progress, "Cleaning test texts")?,
        )
    };

    let word_filter = |records| {
        filter_records(
            vec![Box::new(WordLengthFilter::new(config.min_text_length))],
            records,
            None,
        )
    };
    let train_clean = word_filter(train_clean)?;
    let test_clean = word_filter(test_clean)?;
    let after_word_filter = PartitionSizes::of(&train_clean, &test_clean);
    info!(
        "After word-length filtering: train={}, test={}",
        after_word_filter.train, after_word_filter.test
    );

    let (train_tok, test_tok) = {
        let _span = info_span!("tokens").entered();
        (
            count_tokens(train_clean, &counter, config.show_progress, "Counting training tokens")?,
            count_tokens(test_clean, &counter, config.show_progress, "Counting test tokens")?,
        )
    };
    let max_token_len = PartitionSizes {
        train: longest_token_count(&train_tok),
        test: longest_token_count(&test_tok),
    };
    info!(
        "Max tokenized length: train={}, test={}",
        max_token_len.train, max_token_len.test
    );

    let token_filter = |records| {
        filter_records(
            vec![Box::new(TokenLengthFilter::new(config.max_token_length))],
            records,
            None,
        )
    };
    let train_final = shuffle_records(token_filter(train_tok)?, config.seed);
    let test_final = shuffle_records(token_filter(test_tok)?, config.seed);
    let after_token_filter = PartitionSizes::of(&train_final, &test_final);

    let train_labeled = encode(train_final.clone(), config.unknown_label_policy)?;
    let test_labeled = encode(test_final.clone(), config.unknown_label_policy)?;
    let prepared = prepare_for_training(train_labeled, test_labeled, config)?;

    let mut classifier = TfidfNaiveBayes::new();
    classifier.fit(&prepared.x_train, &prepared.y_train)?;
    let predictions = classifier.predict(&prepared.x_test)?;
    let metrics = evaluate(&prepared.y_test, &predictions)?;

    let (best, best_f1) = metrics.best_class();
    let (worst, worst_f1) = metrics.worst_class();
    info!(
        accuracy = metrics.accuracy,
        "Evaluation complete: accuracy {:.2}%, best {} (F1 {:.2}%), worst {} (F1 {:.2}%)",
        metrics.accuracy * 100.0,
        best,
        best_f1 * 100.0,
        worst,
        worst_f1 * 100.0
    );

    timer.observe_duration();
    PIPELINE_RUNS_TOTAL.inc();

    Ok(PipelineRun {
        total_records,
        columns,
        raw_label_counts,
        initial,
        duplicates_removed,
        after_word_filter,
        after_token_filter,
        max_token_len,
        train_length_stats: length_stats(&train_final),
        test_length_stats: length_stats(&test_final),
        train_records: train_final,
        test_records: test_final,
        prepared,
        predictions,
        metrics,
        tokenizer: counter.name().to_string(),
    })
}
