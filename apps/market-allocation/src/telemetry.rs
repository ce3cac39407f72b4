//! Logging Setup
//!
//! Installs a `tracing` subscriber writing to stderr, so stdout stays free
//! for the allocation report.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Filter directives; falls back to `observability.logging.level`
//! - `observability.logging.format`: `json`, `pretty` or `compact`
//!
//! # Usage
//!
//! ```rust,ignore
//! use market_allocation::config::LoggingConfig;
//! use market_allocation::telemetry::init_logging;
//!
//! init_logging(&LoggingConfig::default());
//! ```

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed, which leaves
/// the existing one in place.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let installed = match config.format.as_str() {
        "pretty" => builder.pretty().try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder
            .json()
            .with_current_span(config.include_spans)
            .with_span_list(config.include_spans)
            .try_init(),
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let config = LoggingConfig {
            format: "compact".to_string(),
            ..LoggingConfig::default()
        };

        init_logging(&config);
        assert!(!init_logging(&config));
    }
}
