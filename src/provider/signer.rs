//! Local key loading for the RPC provider.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::provider::error::{ProviderError, ProviderResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "BNB_TRANSFER_PRIVATE_KEY";

/// The single account a headless host signs for.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    signer: PrivateKeySigner,
}

impl LocalSigner {
    /// Create a signer from a hex-encoded private key (with or without 0x prefix).
    pub fn from_private_key(private_key_hex: &str) -> ProviderResult<Self> {
        let key_hex = private_key_hex
            .trim()
            .strip_prefix("0x")
            .unwrap_or(private_key_hex.trim());

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ProviderError::Unsupported(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Signer loaded");

        Ok(Self { signer })
    }

    /// Load the key from `BNB_TRANSFER_PRIVATE_KEY`.
    pub fn from_env() -> ProviderResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ProviderError::Unsupported(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet filler input for alloy providers.
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}
