// src/classifier/mod.rs

pub mod metrics;
pub mod naive_bayes;
pub mod vectorizer;

pub use metrics::{evaluate, AverageMetrics, ClassMetrics, EvaluationMetrics};
pub use naive_bayes::{MultinomialNaiveBayes, TfidfNaiveBayes};
pub use vectorizer::{CountVectorizer, SparseRow, TfidfTransformer};

use crate::data_model::Sentiment;
use crate::error::Result;

/// A text classifier over the three sentiment classes.
pub trait TextClassifier: Send {
    fn name(&self) -> &'static str;

    fn fit(&mut self, texts: &[String], labels: &[Sentiment]) -> Result<()>;

    fn predict(&self, texts: &[String]) -> Result<Vec<Sentiment>>;
}
