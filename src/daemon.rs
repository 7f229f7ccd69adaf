/// Core daemon implementation for the risk service
///
/// Each cycle:
/// 1. Acquires sites and vessels concurrently (two pool workers), each
///    through its own fallback chain
/// 2. Assesses every site against the full site and vessel sets
/// 3. Aggregates per region
/// 4. Publishes the result as the shared `Snapshot` read by the endpoint
///
/// Acquisition never fails, so a cycle only errors when a worker dies.

use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use threadpool::ThreadPool;
use tracing::{error, info, warn};

use crate::acquisition::{Acquired, Acquirer, DataSource};
use crate::analysis::aggregates::{summarize_regions, RegionSummary};
use crate::cache::{FileStore, SiteCache};
use crate::config::AppConfig;
use crate::ingest::http::HttpFeed;
use crate::ingest::synthetic::SyntheticGenerator;
use crate::model::{FeedError, Site, Vessel};
use crate::risk::levels::{assess_all, SiteAssessment};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to build feed client: {0}")]
    Feed(#[from] FeedError),
    #[error("{0} acquisition worker exited without a result")]
    WorkerLost(&'static str),
    #[error("snapshot lock poisoned")]
    Poisoned,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// How often to refresh (default: 15 minutes)
    pub poll_interval_minutes: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { poll_interval_minutes: 15 }
    }
}

impl From<&AppConfig> for DaemonConfig {
    fn from(config: &AppConfig) -> Self {
        Self { poll_interval_minutes: config.daemon.poll_interval_minutes }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Result of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub refreshed_at: DateTime<Utc>,
    pub site_source: DataSource,
    pub vessel_source: DataSource,
    /// When the served site data was fetched upstream; `None` if synthetic.
    pub sites_fetched_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub sites: Vec<Site>,
    #[serde(skip)]
    pub vessels: Vec<Vessel>,
    pub assessments: Vec<SiteAssessment>,
    pub regions: Vec<RegionSummary>,
}

impl Snapshot {
    pub fn build(sites: Acquired<Site>, vessels: Acquired<Vessel>, refreshed_at: DateTime<Utc>) -> Self {
        let assessments = assess_all(&sites.items, &vessels.items);
        let regions = summarize_regions(&sites.items);
        Self {
            refreshed_at,
            site_source: sites.source,
            vessel_source: vessels.source,
            sites_fetched_at: sites.fetched_at,
            sites: sites.items,
            vessels: vessels.items,
            assessments,
            regions,
        }
    }

    pub fn find_assessment(&self, site_id: &str) -> Option<&SiteAssessment> {
        self.assessments.iter().find(|a| a.site_id == site_id)
    }
}

/// Latest snapshot, shared between the refresh loop and the endpoint.
pub type SharedSnapshot = Arc<RwLock<Option<Snapshot>>>;

// ---------------------------------------------------------------------------
// Daemon State
// ---------------------------------------------------------------------------

enum Acquisition {
    Sites(Acquired<Site>),
    Vessels(Acquired<Vessel>),
}

/// Main daemon state
pub struct Daemon {
    config: DaemonConfig,
    acquirer: Arc<Acquirer>,
    pool: ThreadPool,
    snapshot: SharedSnapshot,
}

impl Daemon {
    pub fn new(config: DaemonConfig, acquirer: Acquirer) -> Self {
        Self {
            config,
            acquirer: Arc::new(acquirer),
            pool: ThreadPool::with_name("acquisition".into(), 2),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Wires HTTP feeds, the file cache and the synthetic generator from
    /// the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, DaemonError> {
        let token = config.api_token();
        if token.is_none() {
            warn!(env = %config.feeds.token_env, "no API token set; feeds will be called anonymously");
        }
        let timeout = StdDuration::from_secs(config.feeds.timeout_secs);

        let sites_feed = HttpFeed::new("sites", config.feeds.sites_url.clone(), token.clone(), timeout)?
            .per_reporting_week();
        let vessels_feed = HttpFeed::new("vessels", config.feeds.vessels_url.clone(), token, timeout)?;

        let cache = SiteCache::new(
            Arc::new(FileStore::new(&config.cache.dir)),
            Duration::minutes(config.cache.ttl_minutes),
        );
        let synthetic = SyntheticGenerator::new(
            config.synthetic.seed,
            config.synthetic.site_count,
            config.synthetic.vessel_count,
        );

        let acquirer = Acquirer::new(Box::new(sites_feed), Box::new(vessels_feed), cache, synthetic);
        Ok(Self::new(DaemonConfig::from(config), acquirer))
    }

    pub fn config(&self) -> &DaemonConfig {
        &self.config
    }

    /// Handle for readers such as the HTTP endpoint.
    pub fn snapshot(&self) -> SharedSnapshot {
        Arc::clone(&self.snapshot)
    }

    /// Runs one cycle and publishes its snapshot.
    pub fn refresh(&self) -> Result<(), DaemonError> {
        let now = Utc::now();
        let (tx, rx) = mpsc::channel();

        let acquirer = Arc::clone(&self.acquirer);
        let sites_tx = tx.clone();
        self.pool.execute(move || {
            let _ = sites_tx.send(Acquisition::Sites(acquirer.acquire_sites_at(now)));
        });

        let acquirer = Arc::clone(&self.acquirer);
        self.pool.execute(move || {
            let _ = tx.send(Acquisition::Vessels(acquirer.acquire_vessels_at(now)));
        });

        let mut sites = None;
        let mut vessels = None;
        for message in rx.iter() {
            match message {
                Acquisition::Sites(acquired) => sites = Some(acquired),
                Acquisition::Vessels(acquired) => vessels = Some(acquired),
            }
        }

        let sites = sites.ok_or(DaemonError::WorkerLost("site"))?;
        let vessels = vessels.ok_or(DaemonError::WorkerLost("vessel"))?;

        let snapshot = Snapshot::build(sites, vessels, now);
        info!(
            sites = snapshot.sites.len(),
            vessels = snapshot.vessels.len(),
            site_source = ?snapshot.site_source,
            vessel_source = ?snapshot.vessel_source,
            "refresh complete"
        );
        if snapshot.site_source.is_degraded() || snapshot.vessel_source.is_degraded() {
            warn!("serving degraded data this cycle");
        }

        let mut slot = self.snapshot.write().map_err(|_| DaemonError::Poisoned)?;
        *slot = Some(snapshot);
        Ok(())
    }

    /// Main daemon loop (runs indefinitely)
    pub fn run(&self) -> Result<(), DaemonError> {
        info!(poll_interval_minutes = self.config.poll_interval_minutes, "starting refresh loop");

        loop {
            let start = Utc::now();

            if let Err(e) = self.refresh() {
                error!(error = %e, "refresh failed");
                if matches!(e, DaemonError::Poisoned) {
                    return Err(e);
                }
            }

            // Sleep until next poll interval
            let elapsed = (Utc::now() - start).num_seconds();
            let sleep_seconds = (self.config.poll_interval_minutes * 60) as i64 - elapsed;

            if sleep_seconds > 0 {
                std::thread::sleep(StdDuration::from_secs(sleep_seconds as u64));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::ingest::fixtures::*;
    use crate::ingest::http::FeedSource;

    struct FixedFeed(Result<&'static str, FeedError>);

    impl FeedSource for FixedFeed {
        fn fetch(&self) -> Result<String, FeedError> {
            self.0.clone().map(str::to_string)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn daemon(sites: Result<&'static str, FeedError>, vessels: Result<&'static str, FeedError>) -> Daemon {
        let cache = SiteCache::new(Arc::new(MemoryStore::new()), Duration::minutes(60));
        let acquirer = Acquirer::new(
            Box::new(FixedFeed(sites)),
            Box::new(FixedFeed(vessels)),
            cache,
            SyntheticGenerator::new(Some(9), 8, 3),
        );
        Daemon::new(DaemonConfig::default(), acquirer)
    }

    #[test]
    fn test_default_config() {
        assert_eq!(DaemonConfig::default().poll_interval_minutes, 15);
    }

    #[test]
    fn test_snapshot_empty_before_first_refresh() {
        let daemon = daemon(Ok(fixture_sites_array_json()), Ok(fixture_vessels_json()));
        let snapshot = daemon.snapshot();
        assert!(snapshot.read().expect("lock").is_none());
    }

    #[test]
    fn test_refresh_publishes_live_snapshot() {
        let daemon = daemon(Ok(fixture_sites_array_json()), Ok(fixture_vessels_json()));
        daemon.refresh().expect("refresh should succeed");

        let shared = daemon.snapshot();
        let guard = shared.read().expect("lock");
        let snapshot = guard.as_ref().expect("snapshot published");
        assert_eq!(snapshot.site_source, DataSource::Live);
        assert_eq!(snapshot.vessel_source, DataSource::Live);
        assert_eq!(snapshot.assessments.len(), 3);
        assert_eq!(snapshot.regions.len(), 13);
        assert!(snapshot.find_assessment("12345").is_some());
        assert!(snapshot.find_assessment("nope").is_none());
    }

    #[test]
    fn test_refresh_with_dead_feeds_serves_synthetic() {
        let daemon = daemon(
            Err(FeedError::Transport("refused".to_string())),
            Err(FeedError::Http(502)),
        );
        daemon.refresh().expect("acquisition failures are masked");

        let shared = daemon.snapshot();
        let guard = shared.read().expect("lock");
        let snapshot = guard.as_ref().expect("snapshot published");
        assert_eq!(snapshot.site_source, DataSource::Synthetic);
        assert_eq!(snapshot.vessel_source, DataSource::Synthetic);
        assert_eq!(snapshot.assessments.len(), 8);
        assert!(snapshot.sites_fetched_at.is_none());
    }

    #[test]
    fn test_second_refresh_hits_fresh_cache() {
        let daemon = daemon(Ok(fixture_sites_array_json()), Ok(fixture_vessels_json()));
        daemon.refresh().expect("first refresh");
        daemon.refresh().expect("second refresh");

        let shared = daemon.snapshot();
        let guard = shared.read().expect("lock");
        let snapshot = guard.as_ref().expect("snapshot published");
        assert_eq!(snapshot.site_source, DataSource::FreshCache);
    }
}
