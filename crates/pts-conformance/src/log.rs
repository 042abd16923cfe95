#![forbid(unsafe_code)]

//! Structured logging for the corpus generator.
//!
//! One compact, human-readable layer on stderr so stdout stays free for the
//! run summary. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::HarnessError;

#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init_logging(verbose: bool) -> Result<(), HarnessError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(terminal_layer)
        .try_init()?;
    Ok(())
}
