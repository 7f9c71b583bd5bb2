//! Provider-level errors.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Errors returned by a wallet provider.
///
/// Wallet rejections follow the EIP-1193 / EIP-3085 numeric codes so that an
/// adapter over a real injected provider can map them without loss.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user declined the request in the wallet (code 4001).
    #[error("User rejected the request")]
    UserRejected,

    /// The wallet does not know the requested chain (code 4902).
    #[error("Unrecognized chain: {0}")]
    UnrecognizedChain(String),

    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was included but reverted.
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),

    /// The provider cannot serve this kind of request.
    #[error("Unsupported request: {0}")]
    Unsupported(String),

    /// Any other coded wallet error.
    #[error("Provider error {code}: {message}")]
    Other { code: i64, message: String },
}

impl ProviderError {
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED_CODE: i64 = 4001;
    /// EIP-3085 "unrecognized chain id".
    pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

    /// Map a coded wallet error to a variant.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            Self::USER_REJECTED_CODE => Self::UserRejected,
            Self::UNRECOGNIZED_CHAIN_CODE => Self::UnrecognizedChain(message),
            _ => Self::Other { code, message },
        }
    }

    /// The numeric code, when the error carries one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::UserRejected => Some(Self::USER_REJECTED_CODE),
            Self::UnrecognizedChain(_) => Some(Self::UNRECOGNIZED_CHAIN_CODE),
            Self::Other { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(ProviderError::from_code(4001, "nope"), ProviderError::UserRejected);
        assert!(matches!(
            ProviderError::from_code(4902, "unknown chain 0x38"),
            ProviderError::UnrecognizedChain(_)
        ));
        assert_eq!(
            ProviderError::from_code(-32603, "internal").code(),
            Some(-32603)
        );
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");
        assert_eq!(ProviderError::Rpc("boom".into()).code(), None);
    }
}
