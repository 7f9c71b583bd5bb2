//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive for the configured level.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("bnb_transfer={}", config.log_level.to_ascii_lowercase())
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        let config = ObservabilityConfig {
            log_level: "DEBUG".to_string(),
        };
        assert_eq!(default_directive(&config), "bnb_transfer=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let config = ObservabilityConfig::default();
        init(&config);
        init(&config);
    }
}
