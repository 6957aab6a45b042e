//! ReliefWeb taxonomy ranker (used by the server binary and integration tests).
//!
//! Free text is scored against every entry of three taxonomies (themes, countries, disaster
//! types) with a cross-encoder, and a statistical rule decides per category whether the
//! top-ranked entry is a confident match.
//!
//! ## Pipeline
//! - [`TaxonomyCache`] - per-(language, category) entry lists with fetch coalescing
//! - [`ranking::assemble`] - one (text, candidate) pair per taxonomy entry
//! - [`RankingOrchestrator`] - one scorer call per category, sorted, failures isolated
//! - [`PertinenceDecider`] - `mean + K * std_dev` threshold plus an absolute floor
//! - [`AnalysisResponse`] - per-category decisions with the full ranking
//!
//! [`Analyzer`] runs the categories of one request as independent tasks and joins them.
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod pertinence;
pub mod ranking;
pub mod scoring;
pub mod taxonomy;

pub use analysis::{
    AnalysisError, AnalysisRequest, AnalysisResponse, Analyzer, CategoryOutcome, CategoryStatus,
    LanguagePolicy,
};
pub use config::{Config, ConfigError};
pub use embedding::{EmbeddingError, Reranker, RerankerConfig, RerankerError};
pub use pertinence::{PertinenceConfig, PertinenceDecider, PertinenceDecision, ScoreStats};
pub use ranking::{CategoryFailure, RankedCategoryResult, RankingOrchestrator};
#[cfg(any(test, feature = "mock"))]
pub use scoring::{ScoringFailure, StubScorer};
pub use scoring::{
    CandidatePair, CrossEncoderScorer, RelevanceScorer, ScoredCandidate, ScorerMode, ScoringError,
};
#[cfg(any(test, feature = "mock"))]
pub use taxonomy::{ManualClock, MockTaxonomySource};
pub use taxonomy::{
    Category, Clock, ReliefWebSource, SystemClock, TaxonomyCache, TaxonomyEntry, TaxonomyError,
    TaxonomySource, TaxonomyStore,
};
