//! Logging Infrastructure
//!
//! Structured logging setup for development and production environments.
//! Console output only; the `security` target carries auth events emitted
//! through the `security_log!` macro.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system from `RUST_LOG` / `LOG_LEVEL`.
///
/// JSON output when `LOG_FORMAT=json` (production), human-readable
/// otherwise. Safe to call once at startup; a second call is a no-op
/// because the global subscriber is already set.
pub fn init_logger() {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json_format = std::env::var("LOG_FORMAT")
        .map(|f| f == "json")
        .unwrap_or(false);

    if json_format {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .try_init();
    }
}
