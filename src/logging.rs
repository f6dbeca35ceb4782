//! Tracing subscriber set-up.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when it is set and non-empty.
/// Calling this twice is harmless: the second install fails quietly.
pub fn init_tracing(settings: &LoggingSettings) {
    let default_directive = format!("chain_dashboard={},tower_http=info", settings.level);
    let directive = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if settings.format == "json" {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}
