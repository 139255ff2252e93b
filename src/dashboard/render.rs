// src/dashboard/render.rs

use itertools::Itertools;
use std::fmt::Write;

use super::pages::PageView;
use super::widgets::Widget;
use crate::error::{PipelineError, Result};

const BAR_WIDTH: usize = 40;
const MAX_CELL_CHARS: usize = 60;

/// Turns a built page into a response body.
pub trait Renderer: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn render(&self, page: &PageView) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `None` and an empty value both mean text.
    pub fn parse(value: Option<&str>) -> Result<OutputFormat> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("text") => Ok(OutputFormat::Text),
            Some("json") => Ok(OutputFormat::Json),
            Some(other) => Err(PipelineError::RenderError(format!(
                "unsupported format '{}', expected text or json",
                other
            ))),
        }
    }

    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, page: &PageView) -> Result<String> {
        Ok(serde_json::to_string_pretty(page)?)
    }
}

/// Fixed-width plain text, one block per widget.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

fn truncate_cell(cell: &str) -> String {
    let flat: String = cell
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if flat.chars().count() <= MAX_CELL_CHARS {
        flat
    } else {
        let mut cut: String = flat.chars().take(MAX_CELL_CHARS - 3).collect();
        cut.push_str("...");
        cut
    }
}

fn bar(value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max);
    "#".repeat(len)
}

impl TextRenderer {
    fn write_table(out: &mut String, title: &str, headers: &[String], rows: &[Vec<String>]) {
        let headers: Vec<String> = headers.iter().map(|h| truncate_cell(h)).collect();
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|c| truncate_cell(c)).collect())
            .collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        let line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                .join(" | ")
        };

        let _ = writeln!(out, "## {}", title);
        let _ = writeln!(out, "{}", line(&headers));
        let _ = writeln!(
            out,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .join("-+-")
        );
        if rows.is_empty() {
            let _ = writeln!(out, "(no rows)");
        }
        for row in &rows {
            let _ = writeln!(out, "{}", line(row));
        }
    }

    fn write_widget(out: &mut String, widget: &Widget) {
        match widget {
            Widget::MetricCard { label, value } => {
                let _ = writeln!(out, "[{}] {}", label, value);
            }
            Widget::Table {
                title,
                headers,
                rows,
            } => Self::write_table(out, title, headers, rows),
            Widget::BarChart { title, bars } => {
                let _ = writeln!(out, "## {}", title);
                let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
                let max = bars.iter().map(|b| b.value).max().unwrap_or(0);
                for b in bars {
                    let _ = writeln!(
                        out,
                        "{:<lw$} | {} {}",
                        b.label,
                        bar(b.value, max),
                        b.value,
                        lw = label_width
                    );
                }
            }
            Widget::Histogram { title, bins } => {
                let _ = writeln!(out, "## {}", title);
                let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
                for b in bins {
                    let _ = writeln!(
                        out,
                        "{:>4}-{:<4} | {} {}",
                        b.lower,
                        b.upper,
                        bar(b.count, max),
                        b.count
                    );
                }
            }
            Widget::WordFrequency { title, words } => {
                let _ = writeln!(out, "## {}", title);
                let line = words
                    .iter()
                    .map(|w| format!("{}({})", w.word, w.count))
                    .join(" ");
                let _ = writeln!(out, "{}", line);
            }
            Widget::Warning { message } => {
                let _ = writeln!(out, "WARNING: {}", message);
            }
        }
    }
}

impl Renderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, page: &PageView) -> Result<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "{}", page.title.to_uppercase());
        let _ = writeln!(out, "{}", "=".repeat(60));
        for widget in &page.widgets {
            out.push('\n');
            Self::write_widget(&mut out, widget);
        }
        Ok(out)
    }
}
