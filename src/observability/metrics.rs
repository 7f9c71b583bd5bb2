//! Metrics collection.
//!
//! # Metrics
//! - `wallet_connect_total` (counter): connect attempts by outcome
//! - `wallet_balance_refresh_total` (counter): balance queries by outcome
//! - `wallet_network_check_total` (counter): network guard results
//! - `wallet_transfer_total` (counter): transfer submissions by outcome
//!
//! No exporter is installed by this crate; without a recorder these are no-ops.

pub fn record_connect(outcome: &'static str) {
    ::metrics::counter!("wallet_connect_total", "outcome" => outcome).increment(1);
}

pub fn record_balance_refresh(outcome: &'static str) {
    ::metrics::counter!("wallet_balance_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_network_check(outcome: &'static str) {
    ::metrics::counter!("wallet_network_check_total", "outcome" => outcome).increment(1);
}

pub fn record_transfer(outcome: &'static str) {
    ::metrics::counter!("wallet_transfer_total", "outcome" => outcome).increment(1);
}
