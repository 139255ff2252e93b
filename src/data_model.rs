use crate::utils::text::word_count;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column names. The reader maps configured headers onto these.
pub const TEXT_COLUMN: &str = "Text";
pub const SENTIMENT_COLUMN: &str = "Sentiment";
pub const DATE_COLUMN: &str = "Date";

/// The three sentiment classes, in their fixed encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Every class, indexed by its code. Metric tables rely on this order.
    pub const ALL: [Sentiment; 3] = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    pub fn code(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    pub fn from_code(code: usize) -> Option<Sentiment> {
        Sentiment::ALL.get(code).copied()
    }

    /// Exact, case-sensitive match on the label as it appears in the source file.
    pub fn from_label(label: &str) -> Option<Sentiment> {
        match label {
            "Negative" => Some(Sentiment::Negative),
            "Neutral" => Some(Sentiment::Neutral),
            "Positive" => Some(Sentiment::Positive),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            Sentiment::Negative => "Neg",
            Sentiment::Neutral => "Neu",
            Sentiment::Positive => "Pos",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: usize,        // 0-based row index in the source file
    pub text: String,     // raw, Latin-1 decoded
    pub sentiment: String, // raw label; validated by the encoder
    pub date: Option<String>,
}

/// Loaded rows plus the logical columns the source provided.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Dataset { columns, records }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Same columns, different rows. Used to derive partitions.
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }
}

/// A record after the cleaning chain, with its derived length fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub id: usize,
    pub text: String,
    pub sentiment: String,
    pub date: Option<String>,
    pub text_clean: String,
    pub text_len: usize,
    pub token_len: Option<usize>,
}

impl CleanedRecord {
    pub fn from_record(record: Record, text_clean: String) -> Self {
        let text_len = word_count(&text_clean);
        CleanedRecord {
            id: record.id,
            text: record.text,
            sentiment: record.sentiment,
            date: record.date,
            text_clean,
            text_len,
            token_len: None,
        }
    }
}

/// Not yet cleaned: `text_clean` is empty until `TextCleaner` runs.
impl From<Record> for CleanedRecord {
    fn from(record: Record) -> Self {
        CleanedRecord::from_record(record, String::new())
    }
}

/// A cleaned record whose label has been validated and encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub record: CleanedRecord,
    pub label: Sentiment,
}

/// Per-class counts in fixed class order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDistribution(pub [usize; 3]);

impl ClassDistribution {
    pub fn from_labels<I: IntoIterator<Item = Sentiment>>(labels: I) -> Self {
        let mut counts = [0usize; 3];
        for label in labels {
            counts[label.code()] += 1;
        }
        ClassDistribution(counts)
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.0[sentiment.code()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Share of `sentiment` in percent, 0 for an empty distribution.
    pub fn percentage(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(sentiment) as f64 / total as f64 * 100.0
        }
    }
}

/// The classifier-ready split produced by the balancer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreparedData {
    pub x_train: Vec<String>,
    pub y_train: Vec<Sentiment>,
    pub x_valid: Vec<String>,
    pub y_valid: Vec<Sentiment>,
    pub x_test: Vec<String>,
    pub y_test: Vec<Sentiment>,
    pub distribution_before: ClassDistribution,
    pub distribution_after: ClassDistribution,
}
