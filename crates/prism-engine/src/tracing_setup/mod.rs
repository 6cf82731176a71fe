//! Tracing setup — structured logging with span definitions.

pub mod spans;

use std::sync::Once;

use prism_core::config::ObservabilityConfig;
use prism_core::errors::{PrismError, PrismResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable that overrides `observability.log_level`.
pub const LOG_ENV: &str = "PRISM_LOG";

/// Install the global subscriber.
///
/// `PRISM_LOG` wins over the configured level. Only the first call installs
/// anything; later calls just validate their filter.
pub fn init_tracing(config: &ObservabilityConfig) -> PrismResult<()> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| PrismError::ConfigError(format!("invalid log level {:?}: {e}", config.log_level)))?,
    };
    let json = config.json;

    INIT.call_once(move || {
        let registry = tracing_subscriber::registry().with(filter);
        // Another subscriber may already be installed by the host application.
        let _ = if json {
            registry
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
    });
    Ok(())
}
