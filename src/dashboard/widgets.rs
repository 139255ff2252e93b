// src/dashboard/widgets.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::data_model::CleanedRecord;
use crate::error::{PipelineError, Result};
use crate::utils::stats::histogram;
use crate::utils::text::top_words;

/// Upper bound on words shown by a word-frequency panel.
pub const WORD_CLOUD_MAX_WORDS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: usize,
    pub upper: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// One self-contained panel of a dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    MetricCard {
        label: String,
        value: String,
    },
    Table {
        title: String,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    BarChart {
        title: String,
        bars: Vec<Bar>,
    },
    Histogram {
        title: String,
        bins: Vec<HistogramBin>,
    },
    WordFrequency {
        title: String,
        words: Vec<WordCount>,
    },
    Warning {
        message: String,
    },
}

impl Widget {
    pub fn metric(label: &str, value: impl ToString) -> Widget {
        Widget::MetricCard {
            label: label.to_string(),
            value: value.to_string(),
        }
    }

    pub fn table(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Widget {
        Widget::Table {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    pub fn bar_chart<I, S>(title: &str, bars: I) -> Widget
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Widget::BarChart {
            title: title.to_string(),
            bars: bars
                .into_iter()
                .map(|(label, value)| Bar {
                    label: label.into(),
                    value,
                })
                .collect(),
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Widget::Warning { .. })
    }
}

/// Runs one widget builder. A failure becomes a `Warning` panel instead of failing the page.
pub fn isolate<F>(name: &str, build: F) -> Widget
where
    F: FnOnce() -> Result<Widget>,
{
    match build() {
        Ok(widget) => widget,
        Err(e) => {
            warn!(widget = name, error = %e, "Widget failed to build");
            Widget::Warning {
                message: format!("Could not build {}: {}", name, e),
            }
        }
    }
}

/// Equal-width histogram of word counts.
pub fn length_histogram(title: &str, lengths: &[usize], bins: usize) -> Result<Widget> {
    if lengths.is_empty() {
        return Err(PipelineError::RenderError(format!(
            "no text lengths to plot for '{}'",
            title
        )));
    }
    let (min, max) = lengths.iter().copied().minmax().into_option().unwrap_or((0, 0));
    let width = (max - min + 1).div_ceil(bins.max(1));
    let raw = histogram(lengths, bins);
    Ok(Widget::Histogram {
        title: title.to_string(),
        bins: raw
            .into_iter()
            .map(|(lower, count)| HistogramBin {
                lower,
                upper: lower + width - 1,
                count,
            })
            .collect(),
    })
}

/// Most frequent words of the given cleaned texts. Fails when there is no text at all.
pub fn word_frequency<'a, I>(title: &str, texts: I) -> Result<Widget>
where
    I: IntoIterator<Item = &'a str>,
{
    let words = top_words(texts, WORD_CLOUD_MAX_WORDS);
    if words.is_empty() {
        return Err(PipelineError::RenderError(
            "no words available for a word cloud".to_string(),
        ));
    }
    Ok(Widget::WordFrequency {
        title: title.to_string(),
        words: words
            .into_iter()
            .map(|(word, count)| WordCount { word, count })
            .collect(),
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Calendar day of a tweet timestamp, trying the common formats in order.
pub fn parse_tweet_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%z") {
        return Some(dt.date_naive());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Tweets per calendar day. Unparseable dates are skipped with a warning.
pub fn tweets_per_date(records: &[CleanedRecord]) -> Result<Widget> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut skipped = 0usize;
    let mut first_bad: Option<&str> = None;
    for date in records.iter().filter_map(|r| r.date.as_deref()) {
        match parse_tweet_date(date) {
            Some(day) => *per_day.entry(day).or_insert(0) += 1,
            None => {
                skipped += 1;
                first_bad.get_or_insert(date);
            }
        }
    }
    if skipped > 0 {
        warn!(
            skipped,
            example = first_bad.unwrap_or_default(),
            "Skipped unparseable tweet dates"
        );
    }
    if per_day.is_empty() {
        return Err(PipelineError::RenderError(
            "no parseable dates in the Date column".to_string(),
        ));
    }
    Ok(Widget::bar_chart(
        "Tweets per Date",
        per_day
            .into_iter()
            .map(|(day, count)| (day.format("%Y-%m-%d").to_string(), count)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(id: usize, date: Option<&str>) -> CleanedRecord {
        CleanedRecord {
            id,
            text: "t".to_string(),
            sentiment: "Neutral".to_string(),
            date: date.map(str::to_string),
            text_clean: "t".to_string(),
            text_len: 1,
            token_len: None,
        }
    }

    #[test]
    fn test_isolate_turns_errors_into_warnings() {
        let ok = isolate("cards", || Ok(Widget::metric("Rows", 3)));
        assert_eq!(ok, Widget::metric("Rows", "3"));

        let failed = isolate("word cloud", || word_frequency("Words", std::iter::empty()));
        assert!(failed.is_warning());
        match failed {
            Widget::Warning { message } => assert!(message.contains("word cloud")),
            other => panic!("expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn test_word_frequency_ranks_words() {
        let widget = word_frequency("Words", ["vote now", "vote later", "   "]).unwrap();
        match widget {
            Widget::WordFrequency { words, .. } => {
                assert_eq!(words[0], WordCount { word: "vote".to_string(), count: 2 });
                assert_eq!(words.len(), 3);
            }
            other => panic!("unexpected widget {:?}", other),
        }
        assert!(word_frequency("Words", ["", "  "]).is_err());
    }

    #[test]
    fn test_parse_tweet_date_formats() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        assert_eq!(parse_tweet_date("2024-02-14"), Some(day));
        assert_eq!(parse_tweet_date("2024-02-14 08:30:00"), Some(day));
        assert_eq!(parse_tweet_date("2024-02-14T08:30:00+07:00"), Some(day));
        assert_eq!(parse_tweet_date("2024-02-14 08:30:00+0000"), Some(day));
        assert_eq!(parse_tweet_date("14/02/2024"), Some(day));
        assert_eq!(parse_tweet_date("yesterday"), None);
        assert_eq!(parse_tweet_date(""), None);
    }

    #[test]
    fn test_tweets_per_date_skips_bad_dates() {
        let records = vec![
            dated(0, Some("2024-02-14")),
            dated(1, Some("2024-02-14 10:00:00")),
            dated(2, Some("2024-02-13")),
            dated(3, Some("not a date")),
            dated(4, None),
        ];
        let widget = tweets_per_date(&records).unwrap();
        assert_eq!(
            widget,
            Widget::bar_chart("Tweets per Date", [("2024-02-13", 1), ("2024-02-14", 2)])
        );
        assert!(tweets_per_date(&[dated(0, None)]).is_err());
    }

    #[test]
    fn test_length_histogram_bins() {
        let widget = length_histogram("Lengths", &[5, 6, 7, 8, 20], 4).unwrap();
        match widget {
            Widget::Histogram { bins, .. } => {
                assert_eq!(bins[0].lower, 5);
                assert_eq!(bins[0].upper, 8);
                assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
            }
            other => panic!("unexpected widget {:?}", other),
        }
        assert!(length_histogram("Lengths", &[], 4).is_err());
    }
}
