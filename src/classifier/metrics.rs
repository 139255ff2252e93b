use serde::{Deserialize, Serialize};

use crate::data_model::Sentiment;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Test-set evaluation. Per-class arrays and the confusion matrix are indexed
/// by class code; confusion rows are actual classes, columns predicted ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub per_class: [ClassMetrics; 3],
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub confusion: [[usize; 3]; 3],
    pub total: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl EvaluationMetrics {
    pub fn class(&self, sentiment: Sentiment) -> &ClassMetrics {
        &self.per_class[sentiment.code()]
    }

    /// Highest F1; the first class wins ties.
    pub fn best_class(&self) -> (Sentiment, f64) {
        let mut best = (Sentiment::Negative, self.per_class[0].f1);
        for class in &Sentiment::ALL[1..] {
            let f1 = self.per_class[class.code()].f1;
            if f1 > best.1 {
                best = (*class, f1);
            }
        }
        best
    }

    /// Lowest F1; the first class wins ties.
    pub fn worst_class(&self) -> (Sentiment, f64) {
        let mut worst = (Sentiment::Negative, self.per_class[0].f1);
        for class in &Sentiment::ALL[1..] {
            let f1 = self.per_class[class.code()].f1;
            if f1 < worst.1 {
                worst = (*class, f1);
            }
        }
        worst
    }
}

/// Accuracy, per-class and averaged precision/recall/F1, and the confusion matrix.
/// Undefined ratios are 0. Macro averages cover classes present in either input.
pub fn evaluate(y_true: &[Sentiment], y_pred: &[Sentiment]) -> Result<EvaluationMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ClassifierError(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::ClassifierError(
            "cannot evaluate an empty set of predictions".to_string(),
        ));
    }

    let mut confusion = [[0usize; 3]; 3];
    for (t, p) in y_true.iter().zip(y_pred) {
        confusion[t.code()][p.code()] += 1;
    }
    let total = y_true.len();
    let correct: usize = (0..3).map(|c| confusion[c][c]).sum();

    let mut per_class = [ClassMetrics::default(); 3];
    let mut present = 0usize;
    let mut macro_avg = AverageMetrics::default();
    let mut weighted_avg = AverageMetrics::default();
    for c in 0..3 {
        let tp = confusion[c][c];
        let support: usize = confusion[c].iter().sum();
        let predicted: usize = (0..3).map(|r| confusion[r][c]).sum();
        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        per_class[c] = ClassMetrics {
            precision,
            recall,
            f1,
            support,
        };

        if support > 0 || predicted > 0 {
            present += 1;
            macro_avg.precision += precision;
            macro_avg.recall += recall;
            macro_avg.f1 += f1;
        }
        let weight = support as f64 / total as f64;
        weighted_avg.precision += precision * weight;
        weighted_avg.recall += recall * weight;
        weighted_avg.f1 += f1 * weight;
    }
    let present = present as f64;
    macro_avg.precision /= present;
    macro_avg.recall /= present;
    macro_avg.f1 /= present;

    Ok(EvaluationMetrics {
        accuracy: ratio(correct, total),
        per_class,
        macro_avg,
        weighted_avg,
        confusion,
        total,
    })
}
