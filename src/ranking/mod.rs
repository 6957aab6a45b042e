//! Candidate assembly and per-category ranking.

pub mod assembler;
pub mod orchestrator;
pub mod types;


pub use assembler::{assemble, candidate_text};
pub use orchestrator::{RankingOrchestrator, sort_descending, validate_scores};
pub use types::{CategoryFailure, RankedCategoryResult};
