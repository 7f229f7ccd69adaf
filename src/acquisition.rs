/// Resilient acquisition of sites and vessels.
///
/// Per `acquire_sites` call:
///
/// ```text
/// CheckCache ── fresh ──────────────────────────────► return cached
///     │ stale or absent
///     ▼
///   Fetch ── ok ──► Correct + Sort + Store ─────────► return live
///     │ error
///     ▼
/// TryStaleCache ── hit ─────────────────────────────► return stale
///     │ miss
///     ▼
/// Synthesize ───────────────────────────────────────► return synthetic
/// ```
///
/// Vessels skip the cache tiers: live fetch, else synthetic.
///
/// Nothing here returns an error. Every failure is logged and masked by the
/// next tier; the only observable symptom is `Acquired::source`. A live
/// fetch writes the cache only after it has fully succeeded, and synthetic
/// data is never written.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, SiteCache};
use crate::geo::Corrector;
use crate::ingest::http::FeedSource;
use crate::ingest::sites::parse_sites;
use crate::ingest::synthetic::SyntheticGenerator;
use crate::ingest::vessels::parse_vessels;
use crate::model::{FeedError, Site, Vessel};
use crate::risk::scoring;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Which tier of the fallback chain produced a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    FreshCache,
    Live,
    StaleCache,
    Synthetic,
}

impl DataSource {
    /// True for the tiers that indicate an upstream problem.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DataSource::StaleCache | DataSource::Synthetic)
    }
}

/// A collection and its provenance.
#[derive(Debug, Clone)]
pub struct Acquired<T> {
    pub items: Vec<T>,
    pub source: DataSource,
    /// When the data was fetched from upstream; `None` for synthetic data.
    pub fetched_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Acquirer
// ---------------------------------------------------------------------------

pub struct Acquirer {
    sites_feed: Box<dyn FeedSource>,
    vessels_feed: Box<dyn FeedSource>,
    cache: SiteCache,
    corrector: Corrector,
    synthetic: SyntheticGenerator,
}

impl Acquirer {
    pub fn new(
        sites_feed: Box<dyn FeedSource>,
        vessels_feed: Box<dyn FeedSource>,
        cache: SiteCache,
        synthetic: SyntheticGenerator,
    ) -> Self {
        Self {
            sites_feed,
            vessels_feed,
            cache,
            corrector: Corrector::default(),
            synthetic,
        }
    }

    /// Replaces the corrector used for live records. Synthetic records use
    /// the generator's own corrector.
    pub fn with_corrector(mut self, corrector: Corrector) -> Self {
        self.corrector = corrector;
        self
    }

    /// Current site collection, sorted by current score, highest first.
    pub fn acquire_sites(&self) -> Vec<Site> {
        self.acquire_sites_at(Utc::now()).items
    }

    /// Current vessel collection.
    pub fn acquire_vessels(&self) -> Vec<Vessel> {
        self.acquire_vessels_at(Utc::now()).items
    }

    /// Runs the site fallback chain as of `now`.
    pub fn acquire_sites_at(&self, now: DateTime<Utc>) -> Acquired<Site> {
        let cached = self.cache.load();

        if let Some(entry) = &cached {
            if entry.is_fresh(now, self.cache.ttl()) {
                debug!(
                    count = entry.sites.len(),
                    age_minutes = entry.age(now).num_minutes(),
                    "serving sites from fresh cache"
                );
                return Acquired {
                    items: entry.sites.clone(),
                    source: DataSource::FreshCache,
                    fetched_at: Some(entry.fetched_at),
                };
            }
        }

        match self.fetch_sites() {
            Ok(mut sites) => {
                sort_by_current_score(&mut sites);
                let entry = CacheEntry::new(sites, now);
                if let Err(e) = self.cache.save(&entry) {
                    warn!(error = %e, "failed to write site cache; serving live data anyway");
                }
                info!(count = entry.sites.len(), feed = self.sites_feed.name(), "fetched live sites");
                Acquired {
                    items: entry.sites,
                    source: DataSource::Live,
                    fetched_at: Some(now),
                }
            }
            Err(e) => {
                warn!(error = %e, feed = self.sites_feed.name(), "site fetch failed");
                match cached {
                    Some(entry) => {
                        warn!(
                            count = entry.sites.len(),
                            age_minutes = entry.age(now).num_minutes(),
                            "serving sites from stale cache"
                        );
                        Acquired {
                            items: entry.sites,
                            source: DataSource::StaleCache,
                            fetched_at: Some(entry.fetched_at),
                        }
                    }
                    None => {
                        let mut sites = self.synthetic.sites();
                        sort_by_current_score(&mut sites);
                        warn!(count = sites.len(), "no site cache available; serving synthetic sites");
                        Acquired {
                            items: sites,
                            source: DataSource::Synthetic,
                            fetched_at: None,
                        }
                    }
                }
            }
        }
    }

    /// Runs the vessel fallback chain as of `now`.
    pub fn acquire_vessels_at(&self, now: DateTime<Utc>) -> Acquired<Vessel> {
        let result = self
            .vessels_feed
            .fetch()
            .and_then(|body| parse_vessels(&body));

        match result {
            Ok(parsed) => {
                if parsed.dropped > 0 {
                    warn!(dropped = parsed.dropped, "dropped incomplete vessel records");
                }
                info!(count = parsed.vessels.len(), feed = self.vessels_feed.name(), "fetched live vessels");
                Acquired {
                    items: parsed.vessels,
                    source: DataSource::Live,
                    fetched_at: Some(now),
                }
            }
            Err(e) => {
                let vessels = self.synthetic.vessels();
                warn!(
                    error = %e,
                    feed = self.vessels_feed.name(),
                    count = vessels.len(),
                    "vessel fetch failed; serving synthetic vessels"
                );
                Acquired {
                    items: vessels,
                    source: DataSource::Synthetic,
                    fetched_at: None,
                }
            }
        }
    }

    fn fetch_sites(&self) -> Result<Vec<Site>, FeedError> {
        let body = self.sites_feed.fetch()?;
        let parsed = parse_sites(&body, &self.corrector)?;
        if parsed.dropped > 0 {
            warn!(dropped = parsed.dropped, "dropped incomplete site records");
        }
        Ok(parsed.sites)
    }
}

/// Stable sort by current score, highest first.
pub fn sort_by_current_score(sites: &mut [Site]) {
    sites.sort_by_cached_key(|site| Reverse(scoring::score(site)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryStore, SITES_CACHE_KEY};
    use crate::ingest::fixtures::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubFeed {
        response: Result<String, FeedError>,
        calls: Arc<AtomicUsize>,
    }

    impl StubFeed {
        fn ok(body: &str) -> (Box<Self>, Arc<AtomicUsize>) {
            Self::with(Ok(body.to_string()))
        }

        fn failing(error: FeedError) -> (Box<Self>, Arc<AtomicUsize>) {
            Self::with(Err(error))
        }

        fn with(response: Result<String, FeedError>) -> (Box<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Box::new(Self { response, calls: calls.clone() }), calls)
        }
    }

    impl FeedSource for StubFeed {
        fn fetch(&self) -> Result<String, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 12, 7, 4, 0, 0).single().expect("valid time")
    }

    fn stub_acquirer(
        sites: Box<dyn FeedSource>,
        vessels: Box<dyn FeedSource>,
    ) -> (Acquirer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let cache = SiteCache::new(store.clone(), Duration::hours(1));
        let acquirer = Acquirer::new(sites, vessels, cache, SyntheticGenerator::new(Some(1), 12, 4));
        (acquirer, store)
    }

    #[test]
    fn test_live_fetch_sorts_and_stores() {
        let (sites, site_calls) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        let acquired = acquirer.acquire_sites_at(now());
        assert_eq!(acquired.source, DataSource::Live);
        assert_eq!(acquired.items.len(), 3);
        assert_eq!(site_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes(), 1, "live success writes the cache");

        let scores: Vec<u8> = acquired.items.iter().map(scoring::score).collect();
        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(scores, sorted, "sites should be sorted by score descending");
    }

    #[test]
    fn test_fresh_cache_skips_network() {
        let (sites, site_calls) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        let first = acquirer.acquire_sites_at(now());
        let second = acquirer.acquire_sites_at(now() + Duration::minutes(30));

        assert_eq!(second.source, DataSource::FreshCache);
        assert_eq!(second.items, first.items);
        assert_eq!(second.fetched_at, Some(now()));
        assert_eq!(site_calls.load(Ordering::SeqCst), 1, "no second network call");
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn test_expired_cache_triggers_refetch() {
        let (sites, site_calls) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        acquirer.acquire_sites_at(now());
        let later = acquirer.acquire_sites_at(now() + Duration::minutes(61));
        assert_eq!(later.source, DataSource::Live);
        assert_eq!(site_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.writes(), 2, "refetch overwrites the slot");
    }

    #[test]
    fn test_failure_with_stale_cache_serves_stale() {
        let store = Arc::new(MemoryStore::new());
        let cache = SiteCache::new(store.clone(), Duration::hours(1));
        let old = CacheEntry::new(
            vec![crate::model::sample_site("old", 60.0, 5.0)],
            now() - Duration::hours(5),
        );
        cache.save(&old).expect("seed cache");

        let (sites, _) = StubFeed::failing(FeedError::Http(503));
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let acquirer = Acquirer::new(sites, vessels, cache, SyntheticGenerator::new(Some(1), 5, 2));

        let acquired = acquirer.acquire_sites_at(now());
        assert_eq!(acquired.source, DataSource::StaleCache);
        assert_eq!(acquired.items, old.sites);
        assert_eq!(store.writes(), 1, "stale fallback never writes");
    }

    #[test]
    fn test_failure_without_cache_serves_synthetic_and_does_not_store() {
        let (sites, _) = StubFeed::failing(FeedError::Transport("timed out".to_string()));
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        let acquired = acquirer.acquire_sites_at(now());
        assert_eq!(acquired.source, DataSource::Synthetic);
        assert_eq!(acquired.items.len(), 12);
        assert!(acquired.fetched_at.is_none());
        assert_eq!(store.writes(), 0, "synthetic data is never cached");
    }

    #[test]
    fn test_empty_payload_counts_as_failure() {
        let (sites, _) = StubFeed::ok("[]");
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        let acquired = acquirer.acquire_sites_at(now());
        assert_eq!(acquired.source, DataSource::Synthetic);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_corrupt_cache_is_a_miss() {
        let (sites, _) = StubFeed::failing(FeedError::Http(500));
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);
        store.write(SITES_CACHE_KEY, "not json").expect("raw write");

        let acquired = acquirer.acquire_sites_at(now());
        assert_eq!(acquired.source, DataSource::Synthetic);
    }

    #[test]
    fn test_vessels_live_then_synthetic() {
        let (sites, _) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, vessel_calls) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, store) = stub_acquirer(sites, vessels);

        let live = acquirer.acquire_vessels_at(now());
        assert_eq!(live.source, DataSource::Live);
        assert_eq!(live.fetched_at, Some(now()), "live vessels are stamped with the cycle time");
        assert_eq!(live.items.len(), 3);
        assert_eq!(vessel_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.reads() + store.writes(), 0, "vessels have no cache tier");

        let (sites, _) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, _) = StubFeed::ok(fixture_vessels_empty_json());
        let (acquirer, _) = stub_acquirer(sites, vessels);
        let fallback = acquirer.acquire_vessels_at(now());
        assert_eq!(fallback.source, DataSource::Synthetic);
        assert_eq!(fallback.fetched_at, None);
        assert_eq!(fallback.items.len(), 4);
    }

    #[test]
    fn test_custom_corrector_applies_to_live_records() {
        let (sites, _) = StubFeed::ok(fixture_sites_array_json());
        let (vessels, _) = StubFeed::ok(fixture_vessels_json());
        let (acquirer, _) = stub_acquirer(sites, vessels);
        let acquirer = acquirer.with_corrector(Corrector::with_seed(99));

        let acquired = acquirer.acquire_sites_at(now());
        let hardanger = acquired
            .items
            .iter()
            .find(|s| s.id == "12345")
            .expect("fixture site present");
        assert_eq!(hardanger.position, Corrector::with_seed(99).correct(60.31, 6.22));
    }

    #[test]
    fn test_degraded_sources() {
        assert!(!DataSource::FreshCache.is_degraded());
        assert!(!DataSource::Live.is_degraded());
        assert!(DataSource::StaleCache.is_degraded());
        assert!(DataSource::Synthetic.is_degraded());
    }
}
