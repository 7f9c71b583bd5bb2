//! The compiled-in network this client is built for.

use alloy::primitives::TxHash;

use crate::provider::types::{AddChainParams, ChainId, NativeCurrency};

/// BNB Smart Chain mainnet (56).
pub const BSC_MAINNET: ChainId = ChainId(0x38);

/// BNB Smart Chain testnet (97). Accepted without switching.
pub const BSC_TESTNET: ChainId = ChainId(0x61);

/// Decimals of the native currency. Not configurable.
pub const NATIVE_DECIMALS: u8 = 18;

/// Required chain plus the metadata needed to register it with a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkTarget {
    pub chain_id: ChainId,
    pub secondary_chain_ids: Vec<ChainId>,
    pub name: String,
    pub currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    /// Explorer base URL, with trailing slash.
    pub explorer_url: String,
}

impl NetworkTarget {
    pub fn bnb_smart_chain() -> Self {
        Self {
            chain_id: BSC_MAINNET,
            secondary_chain_ids: vec![BSC_TESTNET],
            name: "BNB Smart Chain".to_string(),
            currency: NativeCurrency {
                name: "BNB".to_string(),
                symbol: "BNB".to_string(),
                decimals: NATIVE_DECIMALS,
            },
            rpc_urls: vec!["https://bsc-dataseed.binance.org/".to_string()],
            explorer_url: "https://bscscan.com/".to_string(),
        }
    }

    /// True for the primary chain or an accepted secondary one.
    pub fn accepts(&self, chain_id: ChainId) -> bool {
        self.chain_id == chain_id || self.secondary_chain_ids.contains(&chain_id)
    }

    /// Payload for `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.chain_id,
            chain_name: self.name.clone(),
            native_currency: self.currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }

    /// Explorer page for a transaction.
    pub fn explorer_tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

impl Default for NetworkTarget {
    fn default() -> Self {
        Self::bnb_smart_chain()
    }
}
