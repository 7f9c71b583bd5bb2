//! Wallet provider backed by alloy JSON-RPC endpoints and a local signer.
//!
//! # Responsibilities
//! - Answer account/chain/balance queries with per-call timeouts and
//!   endpoint failover
//! - Keep a set of known chains and an active one (switch/add semantics of an
//!   injected wallet)
//! - Sign and broadcast transfers, then poll for the receipt on the chain
//!   that broadcast them, whatever chain is active by then
//! - Emit `chainChanged` whenever the active chain changes

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::{RpcError, TransportErrorKind, TransportResult};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{interval, timeout};
use url::Url;

use crate::config::RpcConfig;
use crate::provider::error::{ProviderError, ProviderResult};
use crate::provider::events::{EventHandler, EventKind, ListenerRegistry, ProviderEvent, SubscriptionId};
use crate::provider::signer::LocalSigner;
use crate::provider::types::{AddChainParams, ChainId, TransferReceipt, TransferRequest};
use crate::provider::WalletProvider;

type RpcHandle = Arc<dyn Provider + Send + Sync>;

/// Endpoints serving one chain, primary first.
struct ChainEndpoint {
    chain_id: ChainId,
    urls: Vec<Url>,
    providers: Vec<RpcHandle>,
}

/// Headless stand-in for an injected browser wallet.
pub struct RpcWalletProvider {
    signer: LocalSigner,
    active: ArcSwap<ChainEndpoint>,
    known: DashMap<ChainId, Arc<ChainEndpoint>>,
    /// Endpoint each transaction was broadcast through.
    sent: DashMap<TxHash, Arc<ChainEndpoint>>,
    listeners: ListenerRegistry,
    timeout_duration: Duration,
    receipt_poll: Duration,
    receipt_timeout: Duration,
}

impl RpcWalletProvider {
    /// Connect to the configured endpoints and learn which chain they serve.
    pub async fn connect(config: &RpcConfig, signer: LocalSigner) -> ProviderResult<Self> {
        let timeout_duration = Duration::from_secs(config.timeout_secs);
        let mut urls = Vec::new();

        // 1. Primary endpoint
        let primary: Url = config.url.parse().map_err(|e| {
            ProviderError::Rpc(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        urls.push(primary);

        // 2. Failover endpoints
        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => urls.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let providers = build_providers(&urls, &signer);
        let chain_id = first_ok(&providers, timeout_duration, "eth_chainId", |p| async move {
            p.get_chain_id().await
        })
        .await
        .map(ChainId)?;

        let endpoint = Arc::new(ChainEndpoint {
            chain_id,
            urls,
            providers,
        });

        tracing::info!(
            rpc_url = %config.url,
            chain_id = %chain_id,
            account = %signer.address(),
            "RPC wallet provider initialized"
        );

        Ok(Self::with_endpoint(config, signer, endpoint))
    }

    fn with_endpoint(config: &RpcConfig, signer: LocalSigner, endpoint: Arc<ChainEndpoint>) -> Self {
        let known = DashMap::new();
        known.insert(endpoint.chain_id, endpoint.clone());

        Self {
            signer,
            active: ArcSwap::new(endpoint),
            known,
            sent: DashMap::new(),
            listeners: ListenerRegistry::new(),
            timeout_duration: Duration::from_secs(config.timeout_secs),
            receipt_poll: Duration::from_millis(config.receipt_poll_ms),
            receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
        }
    }

    /// Chain the provider currently talks to.
    pub fn active_chain(&self) -> ChainId {
        self.active.load().chain_id
    }

    /// Where to look for a receipt: the broadcasting endpoint if known,
    /// otherwise the active one.
    fn receipt_endpoint(&self, tx_hash: &TxHash) -> Arc<ChainEndpoint> {
        self.sent
            .get(tx_hash)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| self.active.load_full())
    }

    fn activate(&self, endpoint: Arc<ChainEndpoint>) {
        let chain_id = endpoint.chain_id;
        self.active.store(endpoint);
        tracing::info!(chain_id = %chain_id, "Active chain changed");
        self.listeners.emit(&ProviderEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        Ok(self.active_chain())
    }

    async fn balance(&self, address: Address) -> ProviderResult<U256> {
        let endpoint = self.active.load_full();
        first_ok(&endpoint.providers, self.timeout_duration, "eth_getBalance", |p| async move {
            p.get_balance(address).await
        })
        .await
    }

    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()> {
        if self.active_chain() == chain_id {
            return Ok(());
        }

        let endpoint = self
            .known
            .get(&chain_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                ProviderError::UnrecognizedChain(format!("Unrecognized chain ID {}", chain_id))
            })?;

        self.activate(endpoint);
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()> {
        let urls: Vec<Url> = params
            .rpc_urls
            .iter()
            .filter_map(|raw| match raw.parse() {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "Skipping invalid chain RPC URL");
                    None
                }
            })
            .collect();

        if urls.is_empty() {
            return Err(ProviderError::Rpc(format!(
                "No usable RPC URL for chain {}",
                params.chain_id
            )));
        }

        let providers = build_providers(&urls, &self.signer);
        let reported = first_ok(&providers, self.timeout_duration, "eth_chainId", |p| async move {
            p.get_chain_id().await
        })
        .await?;

        if reported != params.chain_id.0 {
            return Err(ProviderError::Rpc(format!(
                "RPC endpoint reports chain {} instead of {}",
                ChainId(reported),
                params.chain_id
            )));
        }

        let endpoint = Arc::new(ChainEndpoint {
            chain_id: params.chain_id,
            urls,
            providers,
        });
        self.known.insert(params.chain_id, endpoint.clone());

        tracing::info!(
            chain_id = %params.chain_id,
            chain_name = %params.chain_name,
            "Chain registered"
        );

        if self.active_chain() != params.chain_id {
            self.activate(endpoint);
        }
        Ok(())
    }

    async fn send_transfer(&self, request: &TransferRequest) -> ProviderResult<TxHash> {
        if request.from != self.signer.address() {
            return Err(ProviderError::Unsupported(format!(
                "No key for sender {}",
                request.from
            )));
        }

        let endpoint = self.active.load_full();
        let provider = endpoint
            .providers
            .first()
            .cloned()
            .ok_or_else(|| ProviderError::Rpc("No RPC endpoint configured".to_string()))?;

        // Nonce and gas price come from the recommended fillers.
        let tx = TransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_value(request.value)
            .with_gas_limit(request.gas_limit)
            .with_chain_id(endpoint.chain_id.0);

        let pending = match timeout(self.timeout_duration, provider.send_transaction(tx)).await {
            Ok(Ok(pending)) => pending,
            Ok(Err(e)) => return Err(map_rpc_error(e)),
            Err(_) => return Err(ProviderError::Timeout(self.timeout_duration.as_secs())),
        };

        let tx_hash = *pending.tx_hash();
        self.sent.insert(tx_hash, endpoint.clone());
        tracing::info!(
            tx_hash = %tx_hash,
            to = %request.to,
            value = %request.value,
            chain_id = %endpoint.chain_id,
            "Transfer broadcast"
        );
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> ProviderResult<TransferReceipt> {
        let endpoint = self.receipt_endpoint(&tx_hash);
        if endpoint.chain_id != self.active_chain() {
            tracing::info!(
                tx_hash = %tx_hash,
                chain_id = %endpoint.chain_id,
                "Waiting for receipt on the chain that broadcast it"
            );
        }

        let result = timeout(self.receipt_timeout, async {
            let mut ticker = interval(self.receipt_poll);

            loop {
                ticker.tick().await;

                let receipt = first_ok(
                    &endpoint.providers,
                    self.timeout_duration,
                    "eth_getTransactionReceipt",
                    |p| async move { p.get_transaction_receipt(tx_hash).await },
                )
                .await?;

                let Some(receipt) = receipt else {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                };

                if !receipt.status() {
                    return Err(ProviderError::Reverted(tx_hash));
                }

                return Ok(TransferReceipt {
                    tx_hash,
                    block_number: receipt.block_number,
                    gas_used: receipt.gas_used,
                });
            }
        })
        .await;

        // Only a final answer forgets the endpoint; a later wait after a
        // timeout or RPC failure must still poll the same chain.
        let receipt = result
            .unwrap_or_else(|_| Err(ProviderError::Timeout(self.receipt_timeout.as_secs())));
        if matches!(receipt, Ok(_) | Err(ProviderError::Reverted(_))) {
            self.sent.remove(&tx_hash);
        }
        receipt
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.listeners.subscribe(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let active = self.active.load();
        f.debug_struct("RpcWalletProvider")
            .field("account", &self.signer.address())
            .field("chain_id", &active.chain_id)
            .field("rpc_urls", &active.urls)
            .field("known_chains", &self.known.len())
            .finish()
    }
}

fn build_providers(urls: &[Url], signer: &LocalSigner) -> Vec<RpcHandle> {
    let wallet = signer.wallet();
    urls.iter()
        .map(|url| {
            Arc::new(
                ProviderBuilder::new()
                    .wallet(wallet.clone())
                    .connect_http(url.clone()),
            ) as RpcHandle
        })
        .collect()
}

/// Run `call` against each endpoint in order until one answers.
///
/// A JSON-RPC error response is the node's answer and is returned as-is;
/// only transport failures and timeouts move on to the next endpoint.
async fn first_ok<T, F, Fut>(
    providers: &[RpcHandle],
    limit: Duration,
    method: &'static str,
    call: F,
) -> ProviderResult<T>
where
    F: Fn(RpcHandle) -> Fut,
    Fut: Future<Output = TransportResult<T>>,
{
    for (i, provider) in providers.iter().enumerate() {
        match timeout(limit, call(provider.clone())).await {
            Ok(Ok(result)) => return Ok(result),
            Ok(Err(RpcError::ErrorResp(payload))) => {
                return Err(ProviderError::from_code(payload.code, payload.message.to_string()));
            }
            Ok(Err(e)) => {
                tracing::warn!(provider_idx = i, method, error = %e, "RPC error, trying next endpoint");
            }
            Err(_) => {
                tracing::warn!(provider_idx = i, method, "RPC timeout, trying next endpoint");
            }
        }
    }
    Err(ProviderError::Rpc(format!("All RPC endpoints failed for {}", method)))
}

fn map_rpc_error(error: RpcError<TransportErrorKind>) -> ProviderError {
    match error {
        RpcError::ErrorResp(payload) => {
            ProviderError::from_code(payload.code, payload.message.to_string())
        }
        other => ProviderError::Rpc(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn unreachable_config() -> RpcConfig {
        RpcConfig {
            url: "http://127.0.0.1:1".to_string(),
            failover_urls: vec!["not a url".to_string()],
            timeout_secs: 1,
            ..RpcConfig::default()
        }
    }

    #[tokio::test]
    async fn test_connect_fails_when_no_endpoint_answers() {
        let signer = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let result = RpcWalletProvider::connect(&unreachable_config(), signer).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("All RPC endpoints failed"));
    }

    fn offline_endpoint(chain_id: ChainId, signer: &LocalSigner) -> Arc<ChainEndpoint> {
        let urls: Vec<Url> = vec!["http://127.0.0.1:1".parse().unwrap()];
        Arc::new(ChainEndpoint {
            chain_id,
            providers: build_providers(&urls, signer),
            urls,
        })
    }

    #[tokio::test]
    async fn test_receipt_polls_the_broadcasting_chain() {
        let signer = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mainnet = offline_endpoint(ChainId(56), &signer);
        let testnet = offline_endpoint(ChainId(97), &signer);
        let provider = RpcWalletProvider::with_endpoint(&RpcConfig::default(), signer, mainnet.clone());
        provider.known.insert(ChainId(97), testnet);

        let sent_on_mainnet = TxHash::repeat_byte(0x01);
        provider.sent.insert(sent_on_mainnet, mainnet);

        provider.switch_chain(ChainId(97)).await.unwrap();
        assert_eq!(provider.active_chain(), ChainId(97));

        assert_eq!(provider.receipt_endpoint(&sent_on_mainnet).chain_id, ChainId(56));
        assert_eq!(
            provider.receipt_endpoint(&TxHash::repeat_byte(0x02)).chain_id,
            ChainId(97)
        );
    }

    #[tokio::test]
    async fn test_switch_to_unknown_chain_is_unrecognized() {
        let signer = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mainnet = offline_endpoint(ChainId(56), &signer);
        let provider = RpcWalletProvider::with_endpoint(&RpcConfig::default(), signer, mainnet);

        let err = provider.switch_chain(ChainId(97)).await.unwrap_err();
        assert_eq!(err.code(), Some(ProviderError::UNRECOGNIZED_CHAIN_CODE));
        assert_eq!(provider.active_chain(), ChainId(56));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_primary_url() {
        let signer = LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let config = RpcConfig {
            url: "::::".to_string(),
            ..RpcConfig::default()
        };
        let err = RpcWalletProvider::connect(&config, signer).await.unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }
}
