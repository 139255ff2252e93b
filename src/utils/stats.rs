use serde::{Deserialize, Serialize};

/// Summary of a set of word counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
}

impl LengthStats {
    /// All zeros for an empty input.
    pub fn from_lengths(lengths: &[usize]) -> Self {
        if lengths.is_empty() {
            return LengthStats::default();
        }
        let mut sorted = lengths.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();
        let mean = sorted.iter().sum::<usize>() as f64 / n as f64;
        let median = if n % 2 == 1 {
            sorted[n / 2] as f64
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
        };
        LengthStats {
            count: n,
            mean,
            median,
            min: sorted[0],
            max: sorted[n - 1],
        }
    }
}

/// Equal-width histogram over `[min, max]`. Returns `(lower_bound, count)` per bin.
pub fn histogram(values: &[usize], bins: usize) -> Vec<(usize, usize)> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().min().unwrap_or(0);
    let max = values.iter().copied().max().unwrap_or(0);
    let span = max - min + 1;
    let width = span.div_ceil(bins);
    let bin_count = span.div_ceil(width);
    let mut counts = vec![0usize; bin_count];
    for &v in values {
        counts[(v - min) / width] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i * width, c))
        .collect()
}
