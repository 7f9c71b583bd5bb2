//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts and intervals > 0)
//! - Check URLs and the log level
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a config value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&config.rpc.url) {
        errors.push(ValidationError::new("rpc.url", format!("invalid URL '{}': {}", config.rpc.url, e)));
    }
    for url in &config.rpc.failover_urls {
        if let Err(e) = Url::parse(url) {
            errors.push(ValidationError::new(
                "rpc.failover_urls",
                format!("invalid URL '{}': {}", url, e),
            ));
        }
    }

    let positive = [
        ("rpc.timeout_secs", config.rpc.timeout_secs),
        ("rpc.receipt_poll_ms", config.rpc.receipt_poll_ms),
        ("rpc.receipt_timeout_secs", config.rpc.receipt_timeout_secs),
        ("session.balance_refresh_secs", config.session.balance_refresh_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
