use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use super::*;

const TTL: Duration = Duration::from_secs(3600);

fn mock_source() -> Arc<MockTaxonomySource> {
    Arc::new(
        MockTaxonomySource::new()
            .with_entries("en", Category::Theme, &["Agriculture", "Health", "Education"])
            .with_entries("en", Category::Country, &["Chad", "Haiti"]),
    )
}

fn cache_with(source: Arc<MockTaxonomySource>, clock: Arc<ManualClock>) -> TaxonomyCache {
    TaxonomyCache::with_clock(source, TTL, clock)
}

mod category_tests {
    use super::*;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!("theme".parse::<Category>().unwrap(), Category::Theme);
        assert_eq!("Countries".parse::<Category>().unwrap(), Category::Country);
        assert_eq!(
            "disaster-type".parse::<Category>().unwrap(),
            Category::DisasterType
        );
        assert_eq!(
            "disaster_types".parse::<Category>().unwrap(),
            Category::DisasterType
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "format".parse::<Category>().unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::UnknownCategory {
                value: "format".to_string()
            }
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::DisasterType).unwrap(),
            "\"disaster_type\""
        );
        for category in Category::ALL {
            assert_eq!(category.to_string(), category.as_str());
        }
    }
}

mod cached_taxonomy_tests {
    use super::*;

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        let cached = CachedTaxonomy::new(
            vec![
                TaxonomyEntry::new("1", "Flood", Category::DisasterType),
                TaxonomyEntry::new("2", "Drought", Category::DisasterType),
                TaxonomyEntry::new("1", "Flash Flood", Category::DisasterType),
            ],
            chrono::Utc::now(),
        );

        assert_eq!(cached.len(), 2);
        assert_eq!(cached.entries()[0].label, "Flood");
        assert_eq!(cached.entries()[1].label, "Drought");
    }
}

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_fetches_then_hits() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let first = cache.get("en", Category::Theme).await.unwrap();
        let second = cache.get("en", Category::Theme).await.unwrap();

        assert_eq!(first.entries.len(), 3);
        assert_eq!(first.entries[0].label, "Agriculture");
        assert!(!first.stale);
        assert!(Arc::ptr_eq(&first.entries, &second.entries));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        cache.get("en", Category::Theme).await.unwrap();
        cache.get("en", Category::Country).await.unwrap();
        cache.get("fr", Category::Theme).await.unwrap();

        assert_eq!(source.fetch_count(), 3);
        assert_eq!(cache.cached_keys(), 3);
    }

    #[tokio::test]
    async fn test_unknown_key_caches_empty_list() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let lookup = cache.get("es", Category::DisasterType).await.unwrap();

        assert!(lookup.entries.is_empty());
        assert!(cache.contains("es", Category::DisasterType));
    }

    #[tokio::test]
    async fn test_concurrent_misses_trigger_one_fetch() {
        let source = mock_source();
        source.set_delay(Duration::from_millis(50));
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let lookups = (0..16).map(|_| cache.get("en", Category::Theme));
        let results = futures::future::join_all(lookups).await;

        assert_eq!(source.fetch_count(), 1);
        assert!(results.iter().all(|r| r.as_ref().unwrap().entries.len() == 3));
    }

    #[tokio::test]
    async fn test_concurrent_misses_across_tasks_trigger_one_fetch() {
        let source = mock_source();
        source.set_delay(Duration::from_millis(50));
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get("en", Category::Country).await })
            })
            .collect();

        for handle in handles {
            let lookup = handle.await.unwrap().unwrap();
            assert_eq!(lookup.entries.len(), 2);
        }
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_waiter_does_not_cancel_shared_fetch() {
        let source = mock_source();
        source.set_delay(Duration::from_millis(100));
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get("en", Category::Theme).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get("en", Category::Theme).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        first.abort();

        let lookup = second.await.unwrap().unwrap();
        assert_eq!(lookup.entries.len(), 3);
        assert_eq!(source.fetch_count(), 1);
        assert!(cache.contains("en", Category::Theme));
    }

    #[tokio::test]
    async fn test_fetch_completes_after_sole_waiter_times_out() {
        let source = mock_source();
        source.set_delay(Duration::from_millis(100));
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let waited =
            tokio::time::timeout(Duration::from_millis(20), cache.get("en", Category::Theme)).await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(cache.contains("en", Category::Theme));

        let lookup = cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(lookup.entries.len(), 3);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let source = mock_source();
        let clock = Arc::new(ManualClock::fixed());
        let cache = cache_with(source.clone(), clock.clone());

        cache.get("en", Category::Theme).await.unwrap();
        clock.advance(TTL - Duration::from_secs(1));
        cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(source.fetch_count(), 1);

        clock.advance(Duration::from_secs(1));
        source.set_entries("en", Category::Theme, &["Protection"]);
        let refreshed = cache.get("en", Category::Theme).await.unwrap();

        assert_eq!(source.fetch_count(), 2);
        assert_eq!(refreshed.entries.len(), 1);
        assert_eq!(refreshed.entries[0].label, "Protection");
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale() {
        let source = mock_source();
        let clock = Arc::new(ManualClock::fixed());
        let cache = cache_with(source.clone(), clock.clone());

        let fresh = cache.get("en", Category::Theme).await.unwrap();
        clock.advance(TTL * 2);
        source.set_failing(true);

        let stale = cache.get("en", Category::Theme).await.expect("stale value should be served");

        assert!(stale.stale);
        assert_eq!(stale.fetched_at, fresh.fetched_at);
        assert_eq!(stale.entries.as_ref(), fresh.entries.as_ref());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_recovers_after_source_comes_back() {
        let source = mock_source();
        let clock = Arc::new(ManualClock::fixed());
        let cache = cache_with(source.clone(), clock.clone());

        cache.get("en", Category::Theme).await.unwrap();
        clock.advance(TTL * 2);
        source.set_failing(true);
        assert!(cache.get("en", Category::Theme).await.unwrap().stale);

        source.set_failing(false);
        let lookup = cache.get("en", Category::Theme).await.unwrap();
        assert!(!lookup.stale);
        assert_eq!(lookup.fetched_at, clock.now());
    }

    #[tokio::test]
    async fn test_failure_without_previous_value_is_unavailable() {
        let source = mock_source();
        source.set_failing(true);
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let err = cache.get("en", Category::Country).await.unwrap_err();

        assert!(matches!(
            err,
            TaxonomyError::Unavailable {
                category: Category::Country,
                ..
            }
        ));
        assert!(!cache.contains("en", Category::Country));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let source = mock_source();
        source.set_failing(true);
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        assert!(cache.get("en", Category::Theme).await.is_err());
        source.set_failing(false);
        assert!(cache.get("en", Category::Theme).await.is_ok());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        cache.get("en", Category::Theme).await.unwrap();
        cache.get("en", Category::Country).await.unwrap();

        assert_eq!(cache.invalidate(Some("en"), Some(Category::Theme)), 1);
        cache.get("en", Category::Country).await.unwrap();
        assert_eq!(source.fetch_count(), 2);

        cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_wildcards() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        cache.get("en", Category::Theme).await.unwrap();
        cache.get("fr", Category::Theme).await.unwrap();
        cache.get("en", Category::Country).await.unwrap();

        assert_eq!(cache.invalidate(None, Some(Category::Theme)), 2);
        assert_eq!(cache.invalidate(Some("en"), None), 2);
        assert_eq!(cache.invalidate(None, None), 3);
    }

    #[tokio::test]
    async fn test_invalidated_value_remains_stale_fallback() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        cache.get("en", Category::Theme).await.unwrap();
        cache.invalidate(None, None);
        source.set_failing(true);

        let lookup = cache.get("en", Category::Theme).await.unwrap();
        assert!(lookup.stale);
        assert_eq!(lookup.entries.len(), 3);
    }

    #[tokio::test]
    async fn test_invalidate_during_refresh_is_not_lost() {
        let source = mock_source();
        let clock = Arc::new(ManualClock::fixed());
        let cache = cache_with(source.clone(), clock.clone());

        cache.get("en", Category::Theme).await.unwrap();
        clock.advance(TTL * 2);
        source.set_delay(Duration::from_millis(100));

        let refresh = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get("en", Category::Theme).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        source.set_entries("en", Category::Theme, &["Protection"]);
        assert_eq!(cache.invalidate(None, None), 1);

        let refreshed = refresh.await.unwrap().unwrap();
        assert_eq!(refreshed.entries[0].label, "Agriculture");

        let lookup = cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(lookup.entries.len(), 1);
        assert_eq!(lookup.entries[0].label, "Protection");
        assert_eq!(source.fetch_count(), 3);

        cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_get_after_invalidate_does_not_join_older_fetch() {
        let source = mock_source();
        source.set_delay(Duration::from_millis(100));
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get("en", Category::Theme).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        source.set_entries("en", Category::Theme, &["Shelter"]);
        assert_eq!(cache.invalidate(Some("en"), Some(Category::Theme)), 0);

        let lookup = cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(lookup.entries[0].label, "Shelter");
        assert_eq!(source.fetch_count(), 2);

        first.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let cached = cache.get("en", Category::Theme).await.unwrap();
        assert_eq!(cached.entries[0].label, "Shelter");
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_prefetch_counts_usable_keys() {
        let source = mock_source();
        let cache = cache_with(source.clone(), Arc::new(ManualClock::fixed()));

        let ready = cache.prefetch(&["en".to_string(), "fr".to_string()]).await;

        assert_eq!(ready, 6);
        assert_eq!(source.fetch_count(), 6);
        assert_eq!(cache.cached_keys(), 6);
    }
}

mod persistence_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetched_lists_are_persisted_and_hydrated() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::fixed());

        let source = mock_source();
        let cache = TaxonomyCache::with_store(
            source.clone(),
            TTL,
            clock.clone(),
            TaxonomyStore::new(dir.path()),
        );
        cache.get("en", Category::Theme).await.unwrap();

        let restarted_source = Arc::new(MockTaxonomySource::new());
        let restarted = TaxonomyCache::with_store(
            restarted_source.clone(),
            TTL,
            clock.clone(),
            TaxonomyStore::new(dir.path()),
        );
        assert_eq!(restarted.hydrate(&["en".to_string()]).await, 1);

        let lookup = restarted.get("en", Category::Theme).await.unwrap();
        assert_eq!(lookup.entries.len(), 3);
        assert_eq!(restarted_source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_hydrated_list_respects_original_fetch_time() {
        let dir = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::fixed());

        let cache = TaxonomyCache::with_store(
            mock_source(),
            TTL,
            clock.clone(),
            TaxonomyStore::new(dir.path()),
        );
        cache.get("en", Category::Country).await.unwrap();

        clock.advance(TTL * 2);
        let restarted_source = mock_source();
        restarted_source.set_failing(true);
        let restarted = TaxonomyCache::with_store(
            restarted_source.clone(),
            TTL,
            clock.clone(),
            TaxonomyStore::new(dir.path()),
        );
        restarted.hydrate(&["en".to_string()]).await;

        let lookup = restarted.get("en", Category::Country).await.unwrap();
        assert!(lookup.stale);
        assert_eq!(restarted_source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_without_store_is_noop() {
        let cache = cache_with(mock_source(), Arc::new(ManualClock::fixed()));
        assert_eq!(cache.hydrate(&["en".to_string()]).await, 0);
    }
}
