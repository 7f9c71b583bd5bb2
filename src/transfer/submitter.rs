//! Native-currency transfer submission.
//!
//! # Flow
//! ```text
//! submit(recipient, amount)
//!     → validate (no side effects)
//!     → claim None → Pending
//!     → send_transfer   → info notice "Transaction sent: 0x1234...abcd"
//!     → wait_for_receipt
//!     → refresh_balance → Success + success notice
//!
//! any provider failure → Error + error notice
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::TxHash;
use tokio::sync::watch;

use crate::error::WalletError;
use crate::format::{from_base_units, shorten_address};
use crate::network::NATIVE_DECIMALS;
use crate::notice::NoticeSender;
use crate::observability::metrics;
use crate::provider::{ProviderError, TransferRequest};
use crate::session::SessionManager;
use crate::transfer::status::TransferStatus;
use crate::transfer::validate::validate_transfer;

/// Submits transfers through the session's provider and tracks their status.
pub struct TransferSubmitter {
    session: SessionManager,
    notices: NoticeSender,
    status: watch::Sender<TransferStatus>,
    /// Bumped per claimed attempt and per reset; a result only commits if
    /// its attempt is still current.
    attempt: AtomicU64,
}

impl TransferSubmitter {
    pub fn new(session: SessionManager, notices: NoticeSender) -> Self {
        let (status, _) = watch::channel(TransferStatus::None);
        Self {
            session,
            notices,
            status,
            attempt: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> TransferStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransferStatus> {
        self.status.subscribe()
    }

    /// Validate and submit a transfer of `amount` native units to `recipient`.
    ///
    /// Validation failures leave the status untouched. Returns the
    /// transaction hash once the receipt is confirmed.
    pub async fn submit(&self, recipient: &str, amount: &str) -> Result<TxHash, WalletError> {
        let transfer = match validate_transfer(&self.session.session(), recipient, amount) {
            Ok(transfer) => transfer,
            Err(e) => return Err(self.reject(e, "invalid")),
        };
        let Some(provider) = self.session.provider() else {
            return Err(self.reject(WalletError::ProviderUnavailable, "unavailable"));
        };

        let attempt = self.claim()?;
        tracing::info!(
            to = %transfer.to,
            value = %transfer.value,
            "Submitting transfer"
        );

        let request = TransferRequest::native(transfer.from, transfer.to, transfer.value);
        let tx_hash = match provider.send_transfer(&request).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Err(self.fail(attempt, e)),
        };
        self.notices.info(format!(
            "Transaction sent: {}",
            shorten_address(&tx_hash.to_string())
        ));

        let receipt = match provider.wait_for_receipt(tx_hash).await {
            Ok(receipt) => receipt,
            Err(e) => return Err(self.fail(attempt, e)),
        };
        tracing::info!(
            tx_hash = %tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Transfer confirmed"
        );

        self.session.refresh_balance().await;

        let amount = transfer.amount;
        let committed = self.status.send_if_modified(|status| {
            if self.attempt.load(Ordering::SeqCst) != attempt || !status.is_pending() {
                return false;
            }
            *status = TransferStatus::Success {
                tx_hash,
                amount: amount.clone(),
            };
            true
        });
        if !committed {
            tracing::debug!(tx_hash = %tx_hash, "Transfer status was reset while pending");
        }

        metrics::record_transfer("success");
        self.notices.success(format!(
            "Successfully sent {} {}",
            amount,
            self.session.target().currency.symbol
        ));
        Ok(tx_hash)
    }

    /// Dismiss the current status. Also detaches any in-flight attempt.
    pub fn reset_status(&self) {
        self.status.send_if_modified(|status| {
            self.attempt.fetch_add(1, Ordering::SeqCst);
            let changed = *status != TransferStatus::None;
            *status = TransferStatus::None;
            changed
        });
    }

    /// The full balance as a decimal string, for a "max" shortcut.
    pub fn max_amount(&self) -> Option<String> {
        let session = self.session.session();
        session
            .is_connected()
            .then(|| from_base_units(session.balance(), NATIVE_DECIMALS))
    }

    pub fn explorer_url(&self, tx_hash: &TxHash) -> String {
        self.session.target().explorer_tx_url(tx_hash)
    }

    /// Move `None → Pending` atomically, or report what is in the way.
    fn claim(&self) -> Result<u64, WalletError> {
        let mut claimed = Err(WalletError::TransferNotReady("pending"));
        self.status.send_if_modified(|status| {
            if *status != TransferStatus::None {
                claimed = Err(WalletError::TransferNotReady(status.label()));
                return false;
            }
            claimed = Ok(self.attempt.fetch_add(1, Ordering::SeqCst) + 1);
            *status = TransferStatus::Pending;
            true
        });
        claimed.map_err(|e| self.reject(e, "not_ready"))
    }

    fn reject(&self, error: WalletError, outcome: &'static str) -> WalletError {
        tracing::debug!(error = %error, "Transfer not submitted");
        metrics::record_transfer(outcome);
        self.notices.error(error.to_string());
        error
    }

    fn fail(&self, attempt: u64, error: ProviderError) -> WalletError {
        tracing::warn!(error = %error, "Transfer failed");
        let reason = match error {
            ProviderError::UserRejected => "rejected in the wallet".to_string(),
            other => other.to_string(),
        };
        let error = WalletError::SubmissionFailed(reason);

        self.status.send_if_modified(|status| {
            if self.attempt.load(Ordering::SeqCst) != attempt || !status.is_pending() {
                return false;
            }
            *status = TransferStatus::Error {
                message: error.to_string(),
            };
            true
        });

        metrics::record_transfer("failed");
        self.notices.error(error.to_string());
        error
    }
}

impl std::fmt::Debug for TransferSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferSubmitter")
            .field("status", &*self.status.borrow())
            .finish()
    }
}
