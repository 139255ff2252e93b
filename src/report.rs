// src/report.rs

use std::fs;
use std::path::Path;
use tracing::info;

use crate::data_model::{ClassDistribution, Sentiment};
use crate::error::Result;
use crate::runner::PipelineRun;
use crate::utils::stats::LengthStats;

/// `1234567` as `1,234,567`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn distribution_lines(out: &mut Vec<String>, title: &str, dist: &ClassDistribution) {
    out.push(format!("## {}", title));
    for class in Sentiment::ALL {
        out.push(format!(
            "- **{}**: {:.1}% ({} records)",
            class,
            dist.percentage(class),
            thousands(dist.count(class))
        ));
    }
    out.push(String::new());
}

fn length_lines(out: &mut Vec<String>, title: &str, stats: &LengthStats) {
    out.push(format!("### {}:", title));
    out.push(format!("- Mean: {:.1} words", stats.mean));
    out.push(format!("- Median: {:.1} words", stats.median));
    out.push(format!("- Min: {} words", stats.min));
    out.push(format!("- Max: {} words", stats.max));
    out.push(String::new());
}

/// Renders the plain-text analysis report.
pub fn format_report(run: &PipelineRun) -> String {
    let mut out = Vec::new();
    out.push("=".repeat(60));
    out.push("SENTIMENT ANALYSIS REPORT".to_string());
    out.push("=".repeat(60));
    out.push(String::new());

    out.push("## DATASET STATISTICS".to_string());
    out.push(String::new());
    out.push("| Metric | Training Data | Test Data |".to_string());
    out.push("|--------|--------------|-----------|".to_string());
    out.push(format!(
        "| **Initial Records** | {} | {} |",
        thousands(run.initial.train),
        thousands(run.initial.test)
    ));
    out.push(format!(
        "| **After Preprocessing** | {} | {} |",
        thousands(run.after_token_filter.train),
        thousands(run.after_token_filter.test)
    ));
    out.push(format!(
        "| **After Oversampling** | {} | - |",
        thousands(run.train_size_after_oversampling())
    ));
    out.push(format!(
        "| **Validation Data** | {} | - |",
        thousands(run.prepared.x_valid.len())
    ));
    out.push(format!(
        "| **Test Data** | - | {} |",
        thousands(run.prepared.x_test.len())
    ));
    out.push(String::new());

    distribution_lines(
        &mut out,
        "SENTIMENT DISTRIBUTION (BEFORE OVERSAMPLING)",
        &run.prepared.distribution_before,
    );
    distribution_lines(
        &mut out,
        "SENTIMENT DISTRIBUTION (AFTER OVERSAMPLING)",
        &run.prepared.distribution_after,
    );

    out.push("## TEXT LENGTH STATISTICS".to_string());
    out.push(String::new());
    length_lines(&mut out, "Training Data", &run.train_length_stats);
    length_lines(&mut out, "Test Data", &run.test_length_stats);

    let metrics = &run.metrics;
    out.push("## MODEL PERFORMANCE".to_string());
    out.push(String::new());
    out.push(format!(
        "### Overall Accuracy: {:.2}%",
        metrics.accuracy * 100.0
    ));
    out.push(String::new());
    out.push("| Metric | Negative | Neutral | Positive | Average |".to_string());
    out.push("|--------|----------|---------|----------|---------|".to_string());
    let rows: [(&str, fn(&crate::classifier::ClassMetrics) -> f64, f64); 3] = [
        ("Precision", |m| m.precision, metrics.macro_avg.precision),
        ("Recall", |m| m.recall, metrics.macro_avg.recall),
        ("F1-score", |m| m.f1, metrics.macro_avg.f1),
    ];
    for (name, value, average) in rows {
        let mut cells = vec![name.to_string()];
        for class in Sentiment::ALL {
            cells.push(format!("{:.2}%", value(metrics.class(class)) * 100.0));
        }
        cells.push(format!("{:.2}%", average * 100.0));
        out.push(format!("| {} |", cells.join(" | ")));
    }
    let mut support = vec!["Support".to_string()];
    for class in Sentiment::ALL {
        support.push(metrics.class(class).support.to_string());
    }
    support.push(metrics.total.to_string());
    out.push(format!("| {} |", support.join(" | ")));
    out.push(String::new());

    let cm = &metrics.confusion;
    out.push("## CONFUSION MATRIX".to_string());
    out.push(String::new());
    out.push("```".to_string());
    out.push("                Predicted".to_string());
    out.push("            Neg    Neu    Pos".to_string());
    for (row, prefix) in ["Actual Neg", "       Neu", "       Pos"].iter().enumerate() {
        out.push(format!(
            "{}  {:4}    {:4}    {:4}",
            prefix, cm[row][0], cm[row][1], cm[row][2]
        ));
    }
    out.push("```".to_string());
    out.push(String::new());

    out.join("\n")
}

/// Writes the report to `path`, creating parent directories.
pub fn write_report<P: AsRef<Path>>(run: &PipelineRun, path: P) -> Result<String> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let report = format_report(run);
    fs::write(path, &report)?;
    info!("Report written to {}", path.display());
    Ok(report)
}
