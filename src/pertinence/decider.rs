use tracing::debug;

use crate::constants::DEFAULT_SENSITIVITY_K;
use crate::ranking::RankedCategoryResult;

use super::stats::ScoreStats;
use super::types::PertinenceDecision;

/// Tunables of the pertinence rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PertinenceConfig {
    /// Sensitivity in `threshold = mean + k * std_dev`. Lower is more permissive.
    pub k: f64,
    /// Minimum raw score the top candidate must reach, if set.
    pub floor: Option<f64>,
}

impl Default for PertinenceConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_SENSITIVITY_K,
            floor: None,
        }
    }
}

impl PertinenceConfig {
    pub fn new(k: f64, floor: Option<f64>) -> Self {
        Self { k, floor }
    }

    fn meets_floor(&self, score: f64) -> bool {
        self.floor.is_none_or(|floor| score >= floor)
    }
}

/// Decides whether a category's top-ranked entry is a confident match.
///
/// The top score must stand out from the category's own score distribution
/// (`top >= mean + k * std_dev`) and reach the absolute floor. An exact tie across several
/// candidates carries no signal and is never pertinent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PertinenceDecider {
    config: PertinenceConfig,
}

impl PertinenceDecider {
    pub fn new(config: PertinenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PertinenceConfig {
        &self.config
    }

    /// Threshold for a non-empty score distribution.
    pub fn threshold(&self, stats: &ScoreStats) -> f64 {
        if stats.all_equal {
            stats.mean
        } else {
            stats.mean + self.config.k * stats.std_dev
        }
    }

    pub fn decide(&self, ranked: &RankedCategoryResult) -> PertinenceDecision {
        let category = ranked.category;

        if ranked.is_failed() {
            return PertinenceDecision::not_pertinent(category, None);
        }

        let scores: Vec<f32> = ranked.scores().collect();
        let (Some(stats), Some(top)) = (ScoreStats::compute(&scores), ranked.top()) else {
            return PertinenceDecision::not_pertinent(category, None);
        };

        let threshold = self.threshold(&stats);
        let top_score = f64::from(top.score);

        let pertinent = if stats.all_equal {
            stats.count == 1 && self.config.meets_floor(top_score)
        } else {
            top_score >= threshold && self.config.meets_floor(top_score)
        };

        debug!(
            category = %category,
            top_score,
            threshold,
            mean = stats.mean,
            std_dev = stats.std_dev,
            pertinent,
            "Pertinence decided"
        );

        if pertinent {
            PertinenceDecision::pertinent(category, top.entry.clone(), threshold)
        } else {
            PertinenceDecision::not_pertinent(category, Some(threshold))
        }
    }
}
