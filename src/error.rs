//! User-facing error taxonomy.

use thiserror::Error;

/// Errors surfaced by the session manager, network guard and transfer submitter.
///
/// None of these are fatal; every one ends up as a notice and, for
/// submissions, as the `Error` transfer status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet provider is present.
    #[error("No wallet provider found. Install a wallet to use this app.")]
    ProviderUnavailable,

    /// The user declined the connection request.
    #[error("Connection request rejected in the wallet")]
    UserRejected,

    /// Connecting failed for a reason other than a rejection.
    #[error("Failed to connect wallet: {0}")]
    ConnectFailed(String),

    /// Switching to the target network failed.
    #[error("Failed to switch network: {0}")]
    NetworkSwitchFailed(String),

    /// Registering the target network with the wallet failed.
    #[error("Failed to add network: {0}")]
    NetworkSetupFailed(String),

    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Please fill in all fields")]
    MissingField,

    #[error("Invalid recipient address")]
    InvalidAddress,

    #[error("Amount must be a number greater than 0 with at most 18 decimals")]
    InvalidAmount,

    #[error("Insufficient balance")]
    InsufficientBalance,

    /// A previous transfer status has not been dismissed yet.
    #[error("Previous transfer is still {0}; dismiss it first")]
    TransferNotReady(&'static str),

    /// The wallet or the network rejected the transfer.
    #[error("Transaction failed: {0}")]
    SubmissionFailed(String),
}

impl WalletError {
    /// Validation errors are raised before any provider call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::MissingField
                | Self::InvalidAddress
                | Self::InvalidAmount
                | Self::InsufficientBalance
        )
    }
}
