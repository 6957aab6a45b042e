//! Statistical pertinence rule over a category's ranked scores.

pub mod decider;
pub mod stats;
pub mod types;


pub use decider::{PertinenceConfig, PertinenceDecider};
pub use stats::ScoreStats;
pub use types::PertinenceDecision;
