//! Process-wide taxonomy cache with per-key fetch coalescing.
//!
//! Every (language, category) key has at most one fetch in flight. Callers that arrive while a
//! fetch is running clone its [`Shared`] future and await the same result. The fetch itself runs
//! on a spawned task that populates the cache, so it runs to completion even when every caller
//! waiting on it is cancelled.
//!
//! Invalidation bumps a per-key generation. A fetch only writes back to its slot when the
//! generation it started under is still current, so data read before an invalidation is
//! never cached as fresh.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::TimeDelta;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use tracing::{Instrument, debug, info, instrument, warn};

use super::clock::{Clock, SystemClock};
use super::error::TaxonomyError;
use super::source::TaxonomySource;
use super::store::TaxonomyStore;
use super::types::{CachedTaxonomy, Category, TaxonomyKey, TaxonomyLookup};

type SharedFetch = Shared<BoxFuture<'static, Result<TaxonomyLookup, TaxonomyError>>>;

#[derive(Default)]
struct Slot {
    value: Option<CachedTaxonomy>,
    /// Set by invalidation: the value is kept as a fallback but must be refreshed.
    invalidated: bool,
    /// Bumped by invalidation. Fetches started under an older generation do not write back.
    generation: u64,
    in_flight: Option<SharedFetch>,
}

struct CacheInner {
    slots: RwLock<HashMap<TaxonomyKey, Slot>>,
    source: Arc<dyn TaxonomySource>,
    clock: Arc<dyn Clock>,
    store: Option<TaxonomyStore>,
    ttl: TimeDelta,
}

/// Shared handle to the taxonomy cache. Cloning is cheap.
#[derive(Clone)]
pub struct TaxonomyCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for TaxonomyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxonomyCache")
            .field("keys", &self.inner.slots.read().len())
            .field("ttl", &self.inner.ttl)
            .field("persistent", &self.inner.store.is_some())
            .finish()
    }
}

impl CacheInner {
    fn fresh_lookup(&self, slot: &Slot) -> Option<TaxonomyLookup> {
        let value = slot.value.as_ref()?;
        if slot.invalidated {
            return None;
        }
        let age = self.clock.now() - value.fetched_at();
        (age < self.ttl).then(|| TaxonomyLookup::from_cached(value, false))
    }

    async fn fetch_and_populate(
        self: Arc<Self>,
        key: TaxonomyKey,
        generation: u64,
    ) -> Result<TaxonomyLookup, TaxonomyError> {
        debug!(key = %key, generation, "Fetching taxonomy from source");
        let fetched = self.source.fetch(&key.language, key.category).await;

        match fetched {
            Ok(entries) => {
                let cached = CachedTaxonomy::new(entries, self.clock.now());
                let current = {
                    let mut slots = self.slots.write();
                    let slot = slots.entry(key.clone()).or_default();
                    let current = slot.generation == generation;
                    if current {
                        slot.value = Some(cached.clone());
                        slot.invalidated = false;
                        slot.in_flight = None;
                    }
                    current
                };

                if !current {
                    debug!(key = %key, "Taxonomy invalidated while fetching, result not cached");
                    return Ok(TaxonomyLookup::from_cached(&cached, false));
                }
                info!(key = %key, entries = cached.len(), "Taxonomy cached");

                if let Some(store) = &self.store
                    && let Err(e) = store.save(&key, &cached).await
                {
                    warn!(key = %key, error = %e, "Failed to persist taxonomy");
                }

                Ok(TaxonomyLookup::from_cached(&cached, false))
            }
            Err(e) => {
                let mut slots = self.slots.write();
                let slot = slots.entry(key.clone()).or_default();
                if slot.generation == generation {
                    slot.in_flight = None;
                }

                match &slot.value {
                    Some(previous) => {
                        warn!(
                            key = %key,
                            error = %e,
                            fetched_at = %previous.fetched_at(),
                            "Taxonomy refresh failed, serving stale entries"
                        );
                        Ok(TaxonomyLookup::from_cached(previous, true))
                    }
                    None => {
                        warn!(key = %key, error = %e, "Taxonomy fetch failed with nothing cached");
                        Err(TaxonomyError::Unavailable {
                            language: key.language.clone(),
                            category: key.category,
                            reason: e.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Spawns the fetch for `key` and wraps its handle so every waiter can share it.
    fn spawn_fetch(self: &Arc<Self>, key: TaxonomyKey, generation: u64) -> SharedFetch {
        let task = tokio::spawn(
            Arc::clone(self)
                .fetch_and_populate(key.clone(), generation)
                .in_current_span(),
        );
        let inner: Weak<Self> = Arc::downgrade(self);

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    warn!(key = %key, error = %e, "Taxonomy fetch task failed");
                    if let Some(inner) = inner.upgrade() {
                        let mut slots = inner.slots.write();
                        if let Some(slot) = slots.get_mut(&key)
                            && slot.generation == generation
                        {
                            slot.in_flight = None;
                        }
                    }
                    Err(TaxonomyError::Unavailable {
                        language: key.language.clone(),
                        category: key.category,
                        reason: format!("fetch task failed: {}", e),
                    })
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl TaxonomyCache {
    /// Creates an in-memory cache using the wall clock.
    pub fn new(source: Arc<dyn TaxonomySource>, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: Arc<dyn TaxonomySource>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self::build(source, ttl, clock, None)
    }

    /// Creates a cache that persists fetched lists to `store`.
    ///
    /// Call [`TaxonomyCache::hydrate`] to load previously persisted lists.
    pub fn with_store(
        source: Arc<dyn TaxonomySource>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        store: TaxonomyStore,
    ) -> Self {
        Self::build(source, ttl, clock, Some(store))
    }

    fn build(
        source: Arc<dyn TaxonomySource>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        store: Option<TaxonomyStore>,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: RwLock::new(HashMap::new()),
                source,
                clock,
                store,
                ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            }),
        }
    }

    /// Returns the entries for (language, category), fetching on miss or expiry.
    ///
    /// Concurrent callers for the same key share one fetch. A failed refresh falls back to
    /// the previous value (marked stale); with no previous value the call fails with
    /// [`TaxonomyError::Unavailable`].
    #[instrument(skip(self, category), fields(category = %category))]
    pub async fn get(&self, language: &str, category: Category) -> Result<TaxonomyLookup, TaxonomyError> {
        let key = TaxonomyKey::new(language, category);

        let fresh = {
            let slots = self.inner.slots.read();
            slots
                .get(&key)
                .and_then(|slot| self.inner.fresh_lookup(slot))
        };
        if let Some(fresh) = fresh {
            return Ok(fresh);
        }

        let fetch = {
            let mut slots = self.inner.slots.write();
            let slot = slots.entry(key.clone()).or_default();

            // Another caller may have populated the slot between the two locks.
            if let Some(fresh) = self.inner.fresh_lookup(slot) {
                return Ok(fresh);
            }

            match &slot.in_flight {
                Some(fetch) => {
                    debug!("Joining in-flight taxonomy fetch");
                    fetch.clone()
                }
                None => {
                    let fetch = self.inner.spawn_fetch(key, slot.generation);
                    slot.in_flight = Some(fetch.clone());
                    fetch
                }
            }
        };

        fetch.await
    }

    /// Marks matching keys for refresh. `None` matches every language / category.
    ///
    /// Invalidated values stay available as the stale fallback until a refresh succeeds. A
    /// fetch already in flight for a matching key is detached, so the next `get` starts a
    /// new one. Returns how many cached values were invalidated.
    pub fn invalidate(&self, language: Option<&str>, category: Option<Category>) -> usize {
        let mut slots = self.inner.slots.write();
        let mut count = 0;

        for (key, slot) in slots.iter_mut() {
            let language_matches = language.is_none_or(|l| l == key.language);
            let category_matches = category.is_none_or(|c| c == key.category);
            if !(language_matches && category_matches) {
                continue;
            }
            slot.generation += 1;
            slot.in_flight = None;
            if slot.value.is_some() {
                slot.invalidated = true;
                count += 1;
            }
        }

        info!(
            language = language.unwrap_or("*"),
            category = category.map(|c| c.as_str()).unwrap_or("*"),
            invalidated = count,
            "Taxonomy cache invalidated"
        );
        count
    }

    /// Loads persisted lists into memory. Returns how many keys were loaded.
    pub async fn hydrate(&self, languages: &[String]) -> usize {
        let Some(store) = &self.inner.store else {
            return 0;
        };

        let loaded = store.load_all(languages).await;
        let count = loaded.len();

        let mut slots = self.inner.slots.write();
        for (key, cached) in loaded {
            let slot = slots.entry(key).or_default();
            if slot.value.is_none() {
                slot.value = Some(cached);
            }
        }

        info!(keys = count, "Hydrated taxonomy cache from disk");
        count
    }

    /// Populates every (language, category) key. Returns how many keys are usable.
    pub async fn prefetch(&self, languages: &[String]) -> usize {
        let keys: Vec<TaxonomyKey> = languages
            .iter()
            .flat_map(|language| {
                Category::ALL
                    .into_iter()
                    .map(move |category| TaxonomyKey::new(language.clone(), category))
            })
            .collect();

        let lookups = keys.iter().map(|key| async move {
            (key, self.get(&key.language, key.category).await)
        });

        let mut ready = 0;
        for (key, result) in futures_util::future::join_all(lookups).await {
            match result {
                Ok(lookup) => {
                    debug!(
                        key = %key,
                        entries = lookup.entries.len(),
                        stale = lookup.stale,
                        "Prefetched taxonomy"
                    );
                    ready += 1;
                }
                Err(e) => warn!(key = %key, error = %e, "Taxonomy prefetch failed"),
            }
        }
        ready
    }

    /// Returns `true` if a value (fresh or stale) is cached for the key.
    pub fn contains(&self, language: &str, category: Category) -> bool {
        self.inner
            .slots
            .read()
            .get(&TaxonomyKey::new(language, category))
            .is_some_and(|slot| slot.value.is_some())
    }

    /// Number of keys holding a value.
    pub fn cached_keys(&self) -> usize {
        self.inner
            .slots
            .read()
            .values()
            .filter(|slot| slot.value.is_some())
            .count()
    }

    pub fn ttl(&self) -> TimeDelta {
        self.inner.ttl
    }
}
