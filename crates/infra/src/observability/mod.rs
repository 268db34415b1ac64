//! Tracing bootstrap
//!
//! Installs a global `tracing` subscriber built from [`LogConfig`]:
//! an `EnvFilter` (the `RUST_LOG` environment variable wins over the
//! configured level) plus a fmt layer, human readable or JSON lines.
//!
//! Token values are never recorded by this workspace; spans and events only
//! carry whether credentials were attached.

use armageddon_domain::{ArmageddonError, LogConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter for `config`, preferring `RUST_LOG` when it is set
///
/// # Errors
/// Returns `ArmageddonError::Config` if the configured directive is invalid.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ArmageddonError::Config(format!("Invalid log level '{}': {e}", config.level))
        }),
    }
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed (by an earlier call
/// or by the host application); that is not treated as an error.
///
/// # Errors
/// Returns `ArmageddonError::Config` if the log level directive is invalid.
pub fn init_tracing(config: &LogConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init().is_ok()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Tracing initialized");
    }
    Ok(installed)
}
