/// Log initialization for the service binaries.
///
/// Level is read from `AQUARISK_LOG` (standard `EnvFilter` directives such
/// as `debug` or `aquarisk_service::acquisition=debug`), defaulting to
/// `info`. Library code only emits `tracing` events; binaries call `init`
/// once at startup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "AQUARISK_LOG";
pub const DEFAULT_DIRECTIVE: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_target(true))
        .try_init();
}
