//! Keeps the wallet on the target network.

use std::sync::Arc;

use crate::error::WalletError;
use crate::network::target::NetworkTarget;
use crate::notice::NoticeSender;
use crate::observability::metrics;
use crate::provider::{ChainId, ProviderError, WalletProvider};

/// What `ensure_network` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCheck {
    /// Already on the target or an accepted secondary chain.
    OnTarget,
    /// The wallet switched to the target chain.
    Switched,
    /// The wallet did not know the chain; it was registered.
    Added,
}

/// Verifies the active chain and asks the wallet to correct it.
#[derive(Clone)]
pub struct NetworkGuard {
    provider: Arc<dyn WalletProvider>,
    target: NetworkTarget,
    notices: NoticeSender,
}

impl NetworkGuard {
    pub fn new(provider: Arc<dyn WalletProvider>, target: NetworkTarget, notices: NoticeSender) -> Self {
        Self {
            provider,
            target,
            notices,
        }
    }

    pub fn target(&self) -> &NetworkTarget {
        &self.target
    }

    /// Make sure the wallet is on the target network.
    ///
    /// Failures are reported as notices and returned, but they are never fatal:
    /// the wallet simply stays on whatever chain it was on.
    pub async fn ensure_network(&self, current: ChainId) -> Result<NetworkCheck, WalletError> {
        if self.target.accepts(current) {
            metrics::record_network_check("on_target");
            return Ok(NetworkCheck::OnTarget);
        }

        tracing::info!(
            current = %current,
            target = %self.target.chain_id,
            "Wrong network, requesting switch"
        );

        match self.provider.switch_chain(self.target.chain_id).await {
            Ok(()) => {
                metrics::record_network_check("switched");
                Ok(NetworkCheck::Switched)
            }
            Err(ProviderError::UnrecognizedChain(_)) => self.add_target().await,
            Err(e) => {
                tracing::warn!(error = %e, "Network switch failed");
                metrics::record_network_check("switch_failed");
                self.notices
                    .error(format!("Failed to switch to {} network", self.target.name));
                Err(WalletError::NetworkSwitchFailed(e.to_string()))
            }
        }
    }

    async fn add_target(&self) -> Result<NetworkCheck, WalletError> {
        tracing::info!(target = %self.target.chain_id, "Chain unknown to wallet, requesting add");

        match self.provider.add_chain(&self.target.add_chain_params()).await {
            Ok(()) => {
                metrics::record_network_check("added");
                Ok(NetworkCheck::Added)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Adding network failed");
                metrics::record_network_check("setup_failed");
                self.notices
                    .error(format!("Failed to add {} network to the wallet", self.target.name));
                Err(WalletError::NetworkSetupFailed(e.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for NetworkGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkGuard")
            .field("target", &self.target.chain_id)
            .finish()
    }
}
