//! Taxonomy entries, their remote source, and the process-wide cache in front of it.
//!
//! - [`TaxonomySource`] fetches a category's entry list (ReliefWeb in production).
//! - [`TaxonomyStore`] persists fetched lists so restarts start warm.
//! - [`TaxonomyCache`] serves lists with a TTL, coalesces concurrent fetches per key and
//!   falls back to stale data when a refresh fails.

pub mod cache;
pub mod clock;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod source;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::TaxonomyCache;
#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use error::TaxonomyError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTaxonomySource;
pub use source::{ReliefWebSource, TaxonomySource};
pub use store::TaxonomyStore;
pub use types::{CachedTaxonomy, Category, TaxonomyEntry, TaxonomyKey, TaxonomyLookup};
