// src/dashboard/pages.rs

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::widgets::{
    isolate, length_histogram, parse_tweet_date, tweets_per_date, word_frequency, Widget,
};
use crate::data_model::{ClassDistribution, CleanedRecord, Sentiment, DATE_COLUMN};
use crate::error::{PipelineError, Result};
use crate::report::thousands;
use crate::runner::PipelineRun;
use crate::utils::stats::LengthStats;

pub const DEFAULT_SAMPLES: usize = 5;
pub const MAX_SAMPLES: usize = 20;
pub const DEFAULT_MIN_LEN: usize = 1;
pub const DEFAULT_MAX_LEN: usize = 200;
const PREVIEW_ROWS: usize = 10;
const HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageKind {
    Overview,
    DataAnalysis,
    SentimentAnalysis,
    ModelEvaluation,
    DetailedVisualization,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Overview,
        PageKind::DataAnalysis,
        PageKind::SentimentAnalysis,
        PageKind::ModelEvaluation,
        PageKind::DetailedVisualization,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            PageKind::Overview => "overview",
            PageKind::DataAnalysis => "data-analysis",
            PageKind::SentimentAnalysis => "sentiment-analysis",
            PageKind::ModelEvaluation => "model-evaluation",
            PageKind::DetailedVisualization => "detailed-visualization",
        }
    }

    pub fn from_slug(slug: &str) -> Option<PageKind> {
        PageKind::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            PageKind::Overview => "Overview",
            PageKind::DataAnalysis => "Data Analysis",
            PageKind::SentimentAnalysis => "Sentiment Analysis",
            PageKind::ModelEvaluation => "Model Evaluation",
            PageKind::DetailedVisualization => "Detailed Visualization",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Raw query-string parameters of a page request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub format: Option<String>,
    pub sentiment: Option<String>,
    pub samples: Option<usize>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

/// Validated page filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardFilters {
    /// `None` means every class.
    pub sentiment: Option<Sentiment>,
    pub samples: usize,
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for DashboardFilters {
    fn default() -> Self {
        DashboardFilters {
            sentiment: None,
            samples: DEFAULT_SAMPLES,
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl DashboardFilters {
    pub fn from_query(query: &PageQuery) -> Result<Self> {
        let defaults = DashboardFilters::default();
        let sentiment = match query.sentiment.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                Sentiment::ALL
                    .into_iter()
                    .find(|c| c.label().eq_ignore_ascii_case(s))
                    .ok_or_else(|| {
                        PipelineError::RenderError(format!(
                            "unknown sentiment filter '{}', expected All, Negative, Neutral or Positive",
                            s
                        ))
                    })?,
            ),
        };

        let samples = query.samples.unwrap_or(defaults.samples);
        if !(1..=MAX_SAMPLES).contains(&samples) {
            return Err(PipelineError::RenderError(format!(
                "samples must be between 1 and {}, got {}",
                MAX_SAMPLES, samples
            )));
        }

        let min_len = query.min_len.unwrap_or(defaults.min_len);
        let max_len = query.max_len.unwrap_or(defaults.max_len);
        if min_len > max_len {
            return Err(PipelineError::RenderError(format!(
                "min_len ({}) cannot exceed max_len ({})",
                min_len, max_len
            )));
        }

        Ok(DashboardFilters {
            sentiment,
            samples,
            min_len,
            max_len,
        })
    }

    pub fn matches(&self, sentiment: Sentiment) -> bool {
        self.sentiment.map_or(true, |s| s == sentiment)
    }

    fn sentiment_label(&self) -> &'static str {
        self.sentiment.map_or("All", Sentiment::label)
    }
}

/// A built page: a title and its widgets, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub page: PageKind,
    pub title: String,
    pub filters: DashboardFilters,
    pub widgets: Vec<Widget>,
}

pub fn build_page(kind: PageKind, run: &PipelineRun, filters: &DashboardFilters) -> PageView {
    let widgets = match kind {
        PageKind::Overview => overview(run),
        PageKind::DataAnalysis => data_analysis(run),
        PageKind::SentimentAnalysis => sentiment_analysis(run, filters),
        PageKind::ModelEvaluation => model_evaluation(run, filters),
        PageKind::DetailedVisualization => detailed_visualization(run, filters),
    };
    PageView {
        page: kind,
        title: kind.title().to_string(),
        filters: *filters,
        widgets,
    }
}

fn record_sentiment(record: &CleanedRecord) -> Option<Sentiment> {
    Sentiment::from_label(&record.sentiment)
}

fn preview(title: &str, records: &[CleanedRecord]) -> Widget {
    let rows = records
        .iter()
        .take(PREVIEW_ROWS)
        .map(|r| {
            vec![
                r.id.to_string(),
                r.text.clone(),
                r.sentiment.clone(),
                r.date.clone().unwrap_or_default(),
            ]
        })
        .collect();
    Widget::table(title, &["Row", "Text", "Sentiment", "Date"], rows)
}

fn date_range(records: &[CleanedRecord]) -> Option<String> {
    let (first, last) = records
        .iter()
        .filter_map(|r| r.date.as_deref())
        .filter_map(parse_tweet_date)
        .minmax()
        .into_option()?;
    Some(format!("{} to {}", first, last))
}

fn overview(run: &PipelineRun) -> Vec<Widget> {
    let mut widgets = vec![
        Widget::metric("Total Records", thousands(run.total_records)),
        Widget::metric("Training Records", thousands(run.initial.train)),
        Widget::metric("Test Records", thousands(run.initial.test)),
        Widget::metric("Columns", run.columns.len()),
        preview("Training Data Preview", &run.train_records),
        preview("Test Data Preview", &run.test_records),
    ];

    let mut rows = vec![
        vec![
            "Records after preprocessing".to_string(),
            thousands(run.after_token_filter.train),
            thousands(run.after_token_filter.test),
        ],
        vec![
            "Duplicates removed".to_string(),
            thousands(run.duplicates_removed),
            "-".to_string(),
        ],
        vec![
            "Columns".to_string(),
            run.columns.join(", "),
            run.columns.join(", "),
        ],
    ];
    if run.columns.iter().any(|c| c == DATE_COLUMN) {
        rows.push(vec![
            "Date range".to_string(),
            date_range(&run.train_records).unwrap_or_else(|| "-".to_string()),
            date_range(&run.test_records).unwrap_or_else(|| "-".to_string()),
        ]);
    }
    widgets.push(Widget::table(
        "Data Statistics",
        &["Statistic", "Training", "Test"],
        rows,
    ));

    let labels = run
        .raw_label_counts
        .iter()
        .map(|(label, count)| (label.clone(), *count));
    widgets.push(Widget::bar_chart("Raw Label Counts", labels));
    widgets
}

fn distribution_chart(title: &str, dist: &ClassDistribution) -> Widget {
    Widget::bar_chart(
        title,
        Sentiment::ALL.into_iter().map(|c| (c.label(), dist.count(c))),
    )
}

fn lengths(records: &[CleanedRecord]) -> Vec<usize> {
    records.iter().map(|r| r.text_len).collect()
}

fn data_analysis(run: &PipelineRun) -> Vec<Widget> {
    let prepared = &run.prepared;
    let test_dist = ClassDistribution::from_labels(prepared.y_test.iter().copied());
    let mut widgets = vec![
        distribution_chart(
            "Sentiment Distribution (Training Data)",
            &prepared.distribution_before,
        ),
        distribution_chart("Sentiment Distribution (Test Data)", &test_dist),
    ];

    if run.columns.iter().any(|c| c == DATE_COLUMN) {
        widgets.push(isolate("tweets per date", || {
            tweets_per_date(&run.train_records)
        }));
    }

    widgets.push(isolate("training length histogram", || {
        length_histogram(
            "Text Length Distribution (Training)",
            &lengths(&run.train_records),
            HISTOGRAM_BINS,
        )
    }));
    widgets.push(isolate("test length histogram", || {
        length_histogram(
            "Text Length Distribution (Test)",
            &lengths(&run.test_records),
            HISTOGRAM_BINS,
        )
    }));

    let stats = &run.train_length_stats;
    widgets.extend([
        Widget::metric("Mean Length", format!("{:.1} words", stats.mean)),
        Widget::metric("Median Length", format!("{:.1} words", stats.median)),
        Widget::metric("Min Length", format!("{} words", stats.min)),
        Widget::metric("Max Length", format!("{} words", stats.max)),
    ]);
    widgets
}

fn sentiment_analysis(run: &PipelineRun, filters: &DashboardFilters) -> Vec<Widget> {
    let train = &run.prepared.distribution_before;
    let test = ClassDistribution::from_labels(run.prepared.y_test.iter().copied());
    let comparison = Sentiment::ALL
        .into_iter()
        .map(|c| {
            vec![
                c.label().to_string(),
                train.count(c).to_string(),
                test.count(c).to_string(),
            ]
        })
        .collect();

    let selected: Vec<&CleanedRecord> = run
        .train_records
        .iter()
        .filter(|r| record_sentiment(r).is_some_and(|s| filters.matches(s)))
        .collect();

    let samples = selected
        .iter()
        .take(filters.samples)
        .map(|r| {
            vec![
                r.id.to_string(),
                r.sentiment.clone(),
                r.text.clone(),
                r.text_clean.clone(),
            ]
        })
        .collect();

    let sentiment = filters.sentiment_label();
    vec![
        Widget::table(
            "Sentiment Comparison",
            &["Sentiment", "Training", "Test"],
            comparison,
        ),
        Widget::table(
            &format!("Sample Texts ({})", sentiment),
            &["Row", "Sentiment", "Original", "Cleaned"],
            samples,
        ),
        isolate("word cloud", || {
            word_frequency(
                &format!("Word Cloud ({})", sentiment),
                selected.iter().map(|r| r.text_clean.as_str()),
            )
        }),
    ]
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

fn model_evaluation(run: &PipelineRun, filters: &DashboardFilters) -> Vec<Widget> {
    let metrics = &run.metrics;
    let (best, best_f1) = metrics.best_class();
    let (worst, worst_f1) = metrics.worst_class();

    let mut per_class: Vec<Vec<String>> = Sentiment::ALL
        .into_iter()
        .map(|c| {
            let m = metrics.class(c);
            vec![
                c.label().to_string(),
                percent(m.precision),
                percent(m.recall),
                percent(m.f1),
                m.support.to_string(),
            ]
        })
        .collect();
    per_class.push(vec![
        "Macro average".to_string(),
        percent(metrics.macro_avg.precision),
        percent(metrics.macro_avg.recall),
        percent(metrics.macro_avg.f1),
        metrics.total.to_string(),
    ]);

    let confusion = Sentiment::ALL
        .into_iter()
        .map(|actual| {
            let mut row = vec![actual.label().to_string()];
            row.extend(
                metrics.confusion[actual.code()]
                    .iter()
                    .map(|n| n.to_string()),
            );
            row
        })
        .collect();

    let predictions = run
        .prepared
        .x_test
        .iter()
        .zip(&run.prepared.y_test)
        .zip(&run.predictions)
        .filter(|((_, actual), _)| filters.matches(**actual))
        .take(filters.samples)
        .map(|((text, actual), predicted)| {
            vec![
                text.clone(),
                actual.label().to_string(),
                predicted.label().to_string(),
            ]
        })
        .collect();

    vec![
        Widget::metric("Accuracy", percent(metrics.accuracy)),
        Widget::metric("Macro F1", percent(metrics.macro_avg.f1)),
        Widget::metric("Best Class", format!("{} (F1 {})", best, percent(best_f1))),
        Widget::metric("Worst Class", format!("{} (F1 {})", worst, percent(worst_f1))),
        Widget::table(
            "Classification Report",
            &["Class", "Precision", "Recall", "F1-score", "Support"],
            per_class,
        ),
        Widget::table(
            "Confusion Matrix (rows: actual, columns: predicted)",
            &["Actual", "Negative", "Neutral", "Positive"],
            confusion,
        ),
        Widget::table(
            &format!("Sample Predictions ({})", filters.sentiment_label()),
            &["Cleaned Text", "Actual", "Predicted"],
            predictions,
        ),
    ]
}

fn detailed_visualization(run: &PipelineRun, filters: &DashboardFilters) -> Vec<Widget> {
    let in_range: Vec<&CleanedRecord> = run
        .train_records
        .iter()
        .filter(|r| r.text_len >= filters.min_len && r.text_len <= filters.max_len)
        .collect();

    let per_class = Sentiment::ALL
        .into_iter()
        .map(|c| {
            let class_lengths: Vec<usize> = in_range
                .iter()
                .filter(|r| record_sentiment(r) == Some(c))
                .map(|r| r.text_len)
                .collect();
            let stats = LengthStats::from_lengths(&class_lengths);
            vec![
                c.label().to_string(),
                stats.count.to_string(),
                format!("{:.1}", stats.mean),
                format!("{:.1}", stats.median),
                stats.min.to_string(),
                stats.max.to_string(),
            ]
        })
        .collect();

    let filtered_lengths: Vec<usize> = in_range.iter().map(|r| r.text_len).collect();
    vec![
        Widget::metric(
            "Records in Range",
            format!(
                "{} of {} ({}..={} words)",
                thousands(in_range.len()),
                thousands(run.train_records.len()),
                filters.min_len,
                filters.max_len
            ),
        ),
        Widget::table(
            "Text Length by Sentiment",
            &["Sentiment", "Count", "Mean", "Median", "Min", "Max"],
            per_class,
        ),
        isolate("filtered length histogram", || {
            length_histogram("Text Length (Filtered)", &filtered_lengths, HISTOGRAM_BINS)
        }),
    ]
}
