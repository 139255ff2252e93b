use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{PipelineError, Result};

/// Tokens of two or more word characters.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// `(feature index, value)` pairs, sorted by index, zeros omitted.
pub type SparseRow = Vec<(usize, f64)>;

/// Bag-of-words counts over a vocabulary learned from the training texts.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        CountVectorizer::default()
    }

    fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Learns the vocabulary. Feature indices follow the sorted term order.
    pub fn fit(&mut self, texts: &[String]) -> Result<()> {
        let terms: BTreeSet<String> = texts.iter().flat_map(|t| Self::tokenize(t)).collect();
        if terms.is_empty() {
            return Err(PipelineError::ClassifierError(
                "empty vocabulary; the training texts contain no tokens".to_string(),
            ));
        }
        self.vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();
        Ok(())
    }

    /// Term counts per text. Unknown terms are ignored.
    pub fn transform(&self, texts: &[String]) -> Vec<SparseRow> {
        texts
            .iter()
            .map(|text| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in Self::tokenize(text) {
                    if let Some(&idx) = self.vocabulary.get(&token) {
                        *counts.entry(idx).or_insert(0.0) += 1.0;
                    }
                }
                counts.into_iter().collect()
            })
            .collect()
    }

    pub fn fit_transform(&mut self, texts: &[String]) -> Result<Vec<SparseRow>> {
        self.fit(texts)?;
        Ok(self.transform(texts))
    }
}

/// Smoothed IDF weighting, `ln((1 + n) / (1 + df)) + 1`, with L2-normalised rows.
#[derive(Debug, Clone, Default)]
pub struct TfidfTransformer {
    idf: Vec<f64>,
}

impl TfidfTransformer {
    pub fn new() -> Self {
        TfidfTransformer::default()
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn fit(&mut self, counts: &[SparseRow], n_features: usize) {
        let mut df = vec![0usize; n_features];
        for row in counts {
            for &(idx, _) in row {
                df[idx] += 1;
            }
        }
        let n = counts.len() as f64;
        self.idf = df
            .into_iter()
            .map(|d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
    }

    pub fn transform(&self, counts: &[SparseRow]) -> Vec<SparseRow> {
        counts
            .iter()
            .map(|row| {
                let weighted: SparseRow = row
                    .iter()
                    .map(|&(idx, tf)| (idx, tf * self.idf[idx]))
                    .collect();
                let norm = weighted.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    weighted.into_iter().map(|(i, v)| (i, v / norm)).collect()
                } else {
                    weighted
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_vocabulary_is_sorted_and_skips_short_tokens() {
        let mut cv = CountVectorizer::new();
        cv.fit(&texts(&["the cat a I", "Cat dog"])).unwrap();
        let terms: Vec<&String> = cv.vocabulary().keys().collect();
        assert_eq!(terms, vec!["cat", "dog", "the"]);
        assert_eq!(cv.vocabulary()["dog"], 1);
    }

    #[test]
    fn test_transform_counts_and_ignores_unknown() {
        let mut cv = CountVectorizer::new();
        let rows = cv.fit_transform(&texts(&["cat cat dog"])).unwrap();
        assert_eq!(rows[0], vec![(0, 2.0), (1, 1.0)]);
        let unseen = cv.transform(&texts(&["bird bird"]));
        assert!(unseen[0].is_empty());
    }

    #[test]
    fn test_empty_vocabulary_is_an_error() {
        let mut cv = CountVectorizer::new();
        assert!(matches!(
            cv.fit(&texts(&["a b c", ""])),
            Err(PipelineError::ClassifierError(_))
        ));
    }

    #[test]
    fn test_idf_and_normalisation() {
        let mut cv = CountVectorizer::new();
        let counts = cv.fit_transform(&texts(&["cat dog", "cat"])).unwrap();
        let mut tfidf = TfidfTransformer::new();
        tfidf.fit(&counts, cv.vocabulary_size());
        // cat appears in both documents, dog in one.
        assert!((tfidf.idf()[0] - 1.0).abs() < 1e-12);
        assert!((tfidf.idf()[1] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);

        let rows = tfidf.transform(&counts);
        let norm: f64 = rows[0].iter().map(|(_, v)| v * v).sum();
        assert!((norm - 1.0).abs() < 1e-12);
        assert_eq!(rows[1], vec![(0, 1.0)]);
    }
}
