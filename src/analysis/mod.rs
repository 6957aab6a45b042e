//! Request validation, per-category fan-out/fan-in and response assembly.

pub mod analyzer;
pub mod error;
pub mod request;
pub mod response;


pub use analyzer::Analyzer;
pub use error::AnalysisError;
pub use request::{AnalysisRequest, LanguagePolicy, primary_subtag};
pub use response::{
    AnalysisResponse, CategoryOutcome, CategoryStatus, EntryRef, LabelScore, RankingItem,
    ScoreAnalysis,
};
