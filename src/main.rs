//! Aquaculture Risk Service - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Acquires fish-farm sites and vessel positions (live feed, cache, or
//!    synthetic fallback)
//! 2. Corrects site positions off land
//! 3. Scores current, predictive and future (1–2 week) risk for every site
//! 4. Aggregates per production region
//! 5. Optionally serves the results over HTTP
//!
//! Usage:
//!   cargo run --release                              # Daemon without HTTP endpoint
//!   cargo run --release -- --endpoint 8080           # With HTTP endpoint on port 8080
//!   cargo run --release -- --config /etc/aquarisk.toml
//!
//! Environment:
//!   AQUARISK_API_TOKEN - feed bearer token (name configurable, .env honoured)
//!   AQUARISK_LOG       - log filter (default: info)

use aquarisk_service::config::{self, DEFAULT_CONFIG_PATH};
use aquarisk_service::daemon::Daemon;
use aquarisk_service::{endpoint, logging};
use std::env;
use tracing::{error, info};

fn main() {
    println!("🐟 Aquaculture Risk Service");
    println!("===========================\n");

    logging::init();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                match args.get(i + 1).and_then(|p| p.parse().ok()) {
                    Some(port) => endpoint_port = Some(port),
                    None => {
                        eprintln!("Error: --endpoint requires a port number");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--config" => {
                match args.get(i + 1) {
                    Some(path) => config_path = path.clone(),
                    None => {
                        eprintln!("Error: --config requires a file path");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--endpoint PORT] [--config PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    let app_config = match config::load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    let endpoint_port = endpoint_port.or(app_config.endpoint.port);

    println!("📊 Initializing daemon...");
    let daemon = match Daemon::from_config(&app_config) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("\n❌ Initialization failed: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ Daemon initialized\n");

    // Start HTTP endpoint if requested (in background thread)
    if let Some(port) = endpoint_port {
        println!("🚀 Starting HTTP endpoint server...");
        let snapshot = daemon.snapshot();
        std::thread::spawn(move || {
            if let Err(e) = endpoint::start_endpoint_server(port, snapshot) {
                error!(error = %e, "endpoint server stopped");
            }
        });
        println!("   Endpoint running on http://0.0.0.0:{}\n", port);
    }

    println!("🔄 Starting continuous refresh loop...");
    println!("   Poll interval: {} minutes", daemon.config().poll_interval_minutes);
    println!("   Cache: {} (TTL {} min)", app_config.cache.dir.display(), app_config.cache.ttl_minutes);
    println!("   Press Ctrl+C to stop\n");
    info!(config = %config_path, "daemon starting");

    if let Err(e) = daemon.run() {
        eprintln!("\n❌ Daemon error: {}", e);
        std::process::exit(1);
    }
}
