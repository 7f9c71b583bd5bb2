//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! The target network is deliberately absent: it is compiled in.

use serde::{Deserialize, Serialize};

/// Root configuration for the transfer client.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// JSON-RPC endpoints used by the headless wallet provider.
    pub rpc: RpcConfig,

    /// Session behaviour.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// JSON-RPC settings for the RPC wallet provider.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RpcConfig {
    /// Primary JSON-RPC endpoint URL.
    pub url: String,

    /// Failover endpoints, tried in order.
    pub failover_urls: Vec<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub receipt_poll_ms: u64,

    /// How long to wait for a receipt before giving up, in seconds.
    pub receipt_timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://bsc-dataseed.binance.org/".to_string(),
            failover_urls: Vec::new(),
            timeout_secs: 10,
            receipt_poll_ms: 2000,
            receipt_timeout_secs: 120,
        }
    }
}

/// Session manager settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Periodic balance refresh interval while connected, in seconds.
    pub balance_refresh_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            balance_refresh_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
