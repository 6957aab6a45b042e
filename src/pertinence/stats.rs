//! Summary statistics over one category's scores.

use serde::Serialize;

/// Population statistics over a non-empty score list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Every score is exactly equal.
    #[serde(skip)]
    pub all_equal: bool,
}

impl ScoreStats {
    /// Returns `None` for an empty list.
    pub fn compute(scores: &[f32]) -> Option<Self> {
        let first = *scores.first()?;
        let count = scores.len();
        let n = count as f64;

        let values: Vec<f64> = scores.iter().map(|&s| f64::from(s)).collect();
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.clone();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };
        let min = sorted[0];
        let max = sorted[count - 1];

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            median,
            min,
            max,
            range: max - min,
            all_equal: scores.iter().all(|&s| s == first),
        })
    }
}
