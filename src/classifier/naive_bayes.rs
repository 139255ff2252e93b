use tracing::{debug, info};

use crate::classifier::vectorizer::{CountVectorizer, SparseRow, TfidfTransformer};
use crate::classifier::TextClassifier;
use crate::data_model::Sentiment;
use crate::error::{PipelineError, Result};

/// Multinomial naive Bayes with additive smoothing over sparse feature rows.
#[derive(Debug, Clone)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    // Indexed by class code; None for classes absent from training.
    class_log_prior: [Option<f64>; 3],
    feature_log_prob: [Vec<f64>; 3],
}

impl Default for MultinomialNaiveBayes {
    fn default() -> Self {
        MultinomialNaiveBayes::new(1.0)
    }
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Self {
        MultinomialNaiveBayes {
            alpha,
            class_log_prior: [None; 3],
            feature_log_prob: Default::default(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.class_log_prior.iter().any(Option::is_some)
    }

    pub fn fit(&mut self, rows: &[SparseRow], labels: &[Sentiment], n_features: usize) -> Result<()> {
        if rows.is_empty() {
            return Err(PipelineError::ClassifierError(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(PipelineError::ClassifierError(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let mut class_count = [0usize; 3];
        let mut feature_count = [
            vec![0.0; n_features],
            vec![0.0; n_features],
            vec![0.0; n_features],
        ];
        for (row, label) in rows.iter().zip(labels) {
            let c = label.code();
            class_count[c] += 1;
            for &(idx, value) in row {
                feature_count[c][idx] += value;
            }
        }

        let n = rows.len() as f64;
        for class in Sentiment::ALL {
            let c = class.code();
            if class_count[c] == 0 {
                self.class_log_prior[c] = None;
                self.feature_log_prob[c] = Vec::new();
                continue;
            }
            self.class_log_prior[c] = Some((class_count[c] as f64 / n).ln());
            let smoothed_total: f64 =
                feature_count[c].iter().sum::<f64>() + self.alpha * n_features as f64;
            self.feature_log_prob[c] = feature_count[c]
                .iter()
                .map(|fc| ((fc + self.alpha) / smoothed_total).ln())
                .collect();
        }
        debug!(?class_count, n_features, "Naive Bayes fitted");
        Ok(())
    }

    /// Joint log likelihood per class; None for classes never seen in training.
    pub fn joint_log_likelihood(&self, row: &SparseRow) -> [Option<f64>; 3] {
        let mut jll = [None; 3];
        for class in Sentiment::ALL {
            let c = class.code();
            if let Some(prior) = self.class_log_prior[c] {
                let flp = &self.feature_log_prob[c];
                jll[c] = Some(prior + row.iter().map(|&(idx, v)| v * flp[idx]).sum::<f64>());
            }
        }
        jll
    }

    /// Argmax of the joint log likelihood; ties go to the lowest class code.
    pub fn predict(&self, rows: &[SparseRow]) -> Result<Vec<Sentiment>> {
        if !self.is_fitted() {
            return Err(PipelineError::ClassifierError(
                "predict called before fit".to_string(),
            ));
        }
        rows.iter()
            .map(|row| {
                let mut best: Option<(Sentiment, f64)> = None;
                for (class, score) in Sentiment::ALL.iter().zip(self.joint_log_likelihood(row)) {
                    if let Some(score) = score {
                        if best.map_or(true, |(_, s)| score > s) {
                            best = Some((*class, score));
                        }
                    }
                }
                best.map(|(class, _)| class).ok_or_else(|| {
                    PipelineError::ClassifierError("no fitted classes".to_string())
                })
            })
            .collect()
    }
}

/// Count vectorizer, TF-IDF weighting and multinomial naive Bayes, chained.
#[derive(Debug, Clone, Default)]
pub struct TfidfNaiveBayes {
    vectorizer: CountVectorizer,
    tfidf: TfidfTransformer,
    model: MultinomialNaiveBayes,
}

impl TfidfNaiveBayes {
    pub fn new() -> Self {
        TfidfNaiveBayes::default()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

impl TextClassifier for TfidfNaiveBayes {
    fn name(&self) -> &'static str {
        "TfidfNaiveBayes"
    }

    fn fit(&mut self, texts: &[String], labels: &[Sentiment]) -> Result<()> {
        if texts.is_empty() {
            return Err(PipelineError::ClassifierError(
                "cannot fit on an empty training set".to_string(),
            ));
        }
        if texts.len() != labels.len() {
            return Err(PipelineError::ClassifierError(format!(
                "{} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }
        let counts = self.vectorizer.fit_transform(texts)?;
        let n_features = self.vectorizer.vocabulary_size();
        self.tfidf.fit(&counts, n_features);
        let weighted = self.tfidf.transform(&counts);
        self.model.fit(&weighted, labels, n_features)?;
        info!(
            "Trained {} on {} texts with {} features",
            self.name(),
            texts.len(),
            n_features
        );
        Ok(())
    }

    fn predict(&self, texts: &[String]) -> Result<Vec<Sentiment>> {
        if !self.model.is_fitted() {
            return Err(PipelineError::ClassifierError(
                "predict called before fit".to_string(),
            ));
        }
        let counts = self.vectorizer.transform(texts);
        self.model.predict(&self.tfidf.transform(&counts))
    }
}
