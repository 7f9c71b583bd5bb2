//! Transfer status state machine.

use alloy::primitives::TxHash;

/// Status of the current submission attempt.
///
/// Moves `None → Pending → (Success | Error)`; only `reset` returns to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransferStatus {
    #[default]
    None,
    Pending,
    Success {
        tx_hash: TxHash,
        /// The amount as the user typed it, trimmed.
        amount: String,
    },
    Error {
        message: String,
    },
}

impl TransferStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Success or error.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Success { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Pending => "pending",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success { tx_hash, amount } => write!(f, "success: sent {amount} ({tx_hash})"),
            Self::Error { message } => write!(f, "error: {message}"),
            other => f.write_str(other.label()),
        }
    }
}
