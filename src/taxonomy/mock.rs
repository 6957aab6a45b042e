use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::TaxonomyError;
use super::source::TaxonomySource;
use super::types::{Category, TaxonomyEntry, TaxonomyKey};

/// In-memory [`TaxonomySource`] that counts fetches and can be told to fail.
#[derive(Debug, Default)]
pub struct MockTaxonomySource {
    lists: RwLock<HashMap<TaxonomyKey, Vec<TaxonomyEntry>>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
    delay: RwLock<Option<Duration>>,
}

impl MockTaxonomySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`MockTaxonomySource::set_entries`].
    pub fn with_entries(self, language: &str, category: Category, labels: &[&str]) -> Self {
        self.set_entries(language, category, labels);
        self
    }

    /// Serves `labels` as entries with ids `"{category}-{index}"`.
    pub fn set_entries(&self, language: &str, category: Category, labels: &[&str]) {
        let entries = labels
            .iter()
            .enumerate()
            .map(|(i, label)| TaxonomyEntry::new(format!("{}-{}", category, i), *label, category))
            .collect();
        self.set_raw_entries(language, category, entries);
    }

    pub fn set_raw_entries(&self, language: &str, category: Category, entries: Vec<TaxonomyEntry>) {
        self.lists
            .write()
            .insert(TaxonomyKey::new(language, category), entries);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delays every fetch, so concurrent callers overlap.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write() = Some(delay);
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaxonomySource for MockTaxonomySource {
    async fn fetch(
        &self,
        language: &str,
        category: Category,
    ) -> Result<Vec<TaxonomyEntry>, TaxonomyError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        // Lists are read when the fetch starts; changes made during the delay are not seen.
        let entries = self
            .lists
            .read()
            .get(&TaxonomyKey::new(language, category))
            .cloned()
            .unwrap_or_default();

        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(TaxonomyError::Fetch {
                language: language.to_string(),
                category,
                reason: "mock source failure".to_string(),
            });
        }

        Ok(entries)
    }
}
