//! Result assembly: merges each category's ranking and decision into one response.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pertinence::{PertinenceDecider, PertinenceDecision, ScoreStats};
use crate::ranking::RankedCategoryResult;
use crate::scoring::ScoredCandidate;
use crate::taxonomy::{Category, TaxonomyEntry};

/// Number of entries listed at each end of the score analysis.
const ANALYSIS_EDGE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    /// Ranked at least one candidate.
    Ok,
    /// No taxonomy entries for this category and language.
    Empty,
    /// Could not be evaluated; see `error`.
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRef {
    pub id: String,
    pub label: String,
}

impl From<&TaxonomyEntry> for EntryRef {
    fn from(entry: &TaxonomyEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingItem {
    pub id: String,
    pub label: String,
    pub score: f32,
}

impl From<&ScoredCandidate> for RankingItem {
    fn from(candidate: &ScoredCandidate) -> Self {
        Self {
            id: candidate.entry.id.clone(),
            label: candidate.entry.label.clone(),
            score: candidate.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Distribution summary of one category's scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAnalysis {
    #[serde(flatten)]
    pub stats: ScoreStats,
    pub threshold: f64,
    pub top3: Vec<LabelScore>,
    pub bottom3: Vec<LabelScore>,
}

impl ScoreAnalysis {
    fn from_ranking(candidates: &[ScoredCandidate], decider: &PertinenceDecider) -> Option<Self> {
        let scores: Vec<f32> = candidates.iter().map(|c| c.score).collect();
        let stats = ScoreStats::compute(&scores)?;

        let label_score = |c: &ScoredCandidate| LabelScore {
            label: c.entry.label.clone(),
            score: c.score,
        };

        Some(Self {
            threshold: decider.threshold(&stats),
            stats,
            top3: candidates.iter().take(ANALYSIS_EDGE).map(label_score).collect(),
            bottom3: candidates[candidates.len().saturating_sub(ANALYSIS_EDGE)..]
                .iter()
                .map(label_score)
                .collect(),
        })
    }
}

/// Everything the response says about one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOutcome {
    pub status: CategoryStatus,
    pub is_pertinent: bool,
    pub top_entry: Option<EntryRef>,
    /// Full ranking, highest score first, whether or not the category is pertinent.
    pub ranking: Vec<RankingItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ScoreAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl CategoryOutcome {
    pub fn new(
        ranked: &RankedCategoryResult,
        decision: &PertinenceDecision,
        decider: &PertinenceDecider,
    ) -> Self {
        let status = match (&ranked.error, ranked.candidates.is_empty()) {
            (Some(_), _) => CategoryStatus::Error,
            (None, true) => CategoryStatus::Empty,
            (None, false) => CategoryStatus::Ok,
        };

        Self {
            status,
            is_pertinent: decision.is_pertinent(),
            top_entry: decision.top_candidate().map(EntryRef::from),
            ranking: ranked.candidates.iter().map(RankingItem::from).collect(),
            threshold: decision.threshold(),
            analysis: ScoreAnalysis::from_ranking(&ranked.candidates, decider),
            error: ranked.error.as_ref().map(ToString::to_string),
            stale: ranked.stale,
        }
    }
}

/// Per-category decisions and rankings for one input text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub input_text: String,
    pub language: String,
    pub per_category: BTreeMap<Category, CategoryOutcome>,
}

impl AnalysisResponse {
    /// Builds the response from whatever each category produced. Never fails.
    pub fn assemble(
        input_text: impl Into<String>,
        language: impl Into<String>,
        results: impl IntoIterator<Item = (RankedCategoryResult, PertinenceDecision)>,
        decider: &PertinenceDecider,
    ) -> Self {
        let per_category = results
            .into_iter()
            .map(|(ranked, decision)| {
                (
                    ranked.category,
                    CategoryOutcome::new(&ranked, &decision, decider),
                )
            })
            .collect();

        Self {
            input_text: input_text.into(),
            language: language.into(),
            per_category,
        }
    }

    pub fn category(&self, category: Category) -> Option<&CategoryOutcome> {
        self.per_category.get(&category)
    }
}
