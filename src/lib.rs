/// aquarisk_service: risk scoring and position correction for Norwegian
/// fish-farm sites.
///
/// # Module structure
///
/// ```text
/// aquarisk_service
/// ├── model       — shared data types (Site, Vessel, Position, FeedError, …)
/// ├── regions     — the 13 production regions and latitude fallback
/// ├── geo         — deterministic off-land position corrector, distances
/// ├── risk
/// │   ├── scoring — current / predictive / future (1–2 wk) scores with breakdowns
/// │   └── levels  — score → level → colour, per-site assessment
/// ├── ingest
/// │   ├── http    — FeedSource trait, blocking HTTP feed
/// │   ├── sites   — site feed parsing + correction
/// │   ├── vessels — vessel feed parsing + type inference
/// │   ├── synthetic — offline fallback dataset
/// │   └── fixtures (test only) — representative feed payloads
/// ├── cache       — TTL'd last-good site collection (file or memory store)
/// ├── acquisition — cache → live → stale → synthetic fallback chain
/// ├── analysis
/// │   ├── aggregates — per-region counts and means
/// │   └── report     — coastline risk report
/// ├── config      — aquarisk.toml loader
/// ├── logging     — tracing subscriber setup
/// ├── daemon      — refresh loop and shared snapshot
/// └── endpoint    — HTTP API over the snapshot
/// ```

/// Public modules
pub mod acquisition;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod daemon;
pub mod endpoint;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod regions;
pub mod risk;
