//! One-shot coastline risk report.
//!
//! Runs a single acquisition (cache, live feed, or synthetic fallback) and
//! prints the text report to stdout.
//!
//! Usage:
//!   cargo run --bin risk_report
//!   cargo run --bin risk_report -- --config aquarisk.toml --json

use std::env;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use aquarisk_service::acquisition::Acquirer;
use aquarisk_service::analysis::report::RiskReport;
use aquarisk_service::cache::{FileStore, SiteCache};
use aquarisk_service::config::{self, DEFAULT_CONFIG_PATH};
use aquarisk_service::ingest::http::HttpFeed;
use aquarisk_service::ingest::synthetic::SyntheticGenerator;
use aquarisk_service::logging;
use chrono::{Duration, Utc};

fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut as_json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                config_path = args[i + 1].clone();
                i += 2;
            }
            "--json" => {
                as_json = true;
                i += 1;
            }
            _ => {
                eprintln!("Usage: {} [--config PATH] [--json]", args[0]);
                std::process::exit(1);
            }
        }
    }

    let app_config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let token = app_config.api_token();
    let timeout = StdDuration::from_secs(app_config.feeds.timeout_secs);
    let feeds = HttpFeed::new("sites", app_config.feeds.sites_url.clone(), token.clone(), timeout)
        .map(HttpFeed::per_reporting_week)
        .and_then(|sites| {
            HttpFeed::new("vessels", app_config.feeds.vessels_url.clone(), token, timeout)
                .map(|vessels| (sites, vessels))
        });
    let (sites_feed, vessels_feed) = match feeds {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("❌ Failed to build feed client: {}", e);
            std::process::exit(1);
        }
    };

    let acquirer = Acquirer::new(
        Box::new(sites_feed),
        Box::new(vessels_feed),
        SiteCache::new(
            Arc::new(FileStore::new(&app_config.cache.dir)),
            Duration::minutes(app_config.cache.ttl_minutes),
        ),
        SyntheticGenerator::new(
            app_config.synthetic.seed,
            app_config.synthetic.site_count,
            app_config.synthetic.vessel_count,
        ),
    );

    let now = Utc::now();
    let sites = acquirer.acquire_sites_at(now);
    let vessels = acquirer.acquire_vessels_at(now);
    let report = RiskReport::build(&sites.items, &vessels.items, now);

    if as_json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to encode report: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report);
        println!("Site data: {:?} | Vessel data: {:?}", sites.source, vessels.source);
    }
}
