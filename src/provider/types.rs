//! Wire-level types shared by every wallet provider implementation.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Gas allocated to a plain native-currency transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Chain ID type for strong typing.
///
/// Wallets exchange chain ids as `0x`-prefixed hex strings, so that is the
/// `Display` and serde form. `FromStr` also accepts plain decimal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => s.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|e| format!("Invalid chain id '{}': {}", s, e))
    }
}

impl TryFrom<String> for ChainId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.to_string()
    }
}

/// Native currency metadata, as carried by an add-chain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Parameters of a `wallet_addEthereumChain` request (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// A native-currency value transfer, ready to hand to the wallet.
///
/// No gas price is set; the wallet picks one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    /// Amount in base units (wei).
    pub value: U256,
    pub gas_limit: u64,
}

impl TransferRequest {
    /// Build a plain transfer with the fixed gas allocation.
    pub fn native(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            gas_limit: TRANSFER_GAS_LIMIT,
        }
    }
}

/// Receipt of an included transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}
