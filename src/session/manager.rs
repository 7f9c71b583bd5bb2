//! Wallet session manager.
//!
//! # Responsibilities
//! - Connect/disconnect and own the `Session` snapshot
//! - Mediate every provider call made on behalf of the session
//! - React to `accountsChanged` / `chainChanged` notifications
//! - Run the periodic balance refresh while connected
//!
//! # Ordering
//! - `generation` is bumped by every connect and disconnect; a connect only
//!   commits if nothing superseded it
//! - `chain_epoch` is bumped by every `chainChanged`; a connect that saw a
//!   notification while in flight uses the notified chain id
//! - `balance_ticket` tags balance queries; only the latest issued one commits
//! - `resynced_epoch` is the last chain epoch whose follow-up (network check
//!   and balance refresh) already ran, either in `connect` or in `resync`
//!
//! All commits happen inside `watch::Sender::send_if_modified`, which
//! serializes them and publishes whole snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::error::WalletError;
use crate::network::{NetworkCheck, NetworkGuard, NetworkTarget};
use crate::notice::NoticeSender;
use crate::observability::metrics;
use crate::provider::{
    ChainId, EventHandler, EventKind, ProviderError, ProviderEvent, SubscriptionId, WalletProvider,
};
use crate::session::refresh;
use crate::session::state::Session;

/// Result of a successful `connect`.
#[derive(Debug)]
pub struct Connection {
    pub account: Address,
    pub chain_id: ChainId,
    pub balance: U256,
    /// The network check runs in the background; await it or drop it.
    pub network: NetworkCheckHandle,
}

/// Pending outcome of a background network check.
#[derive(Debug)]
pub struct NetworkCheckHandle {
    rx: oneshot::Receiver<Result<NetworkCheck, WalletError>>,
}

impl NetworkCheckHandle {
    pub async fn outcome(self) -> Result<NetworkCheck, WalletError> {
        self.rx.await.unwrap_or_else(|_| {
            Err(WalletError::NetworkSwitchFailed(
                "network check was cancelled".to_string(),
            ))
        })
    }

    /// Wait for the check without failing on it. A failed switch or add
    /// leaves the wallet on its current chain and later actions use that.
    pub async fn finish(self) -> Option<NetworkCheck> {
        match self.outcome().await {
            Ok(check) => {
                tracing::debug!(?check, "Network check finished");
                Some(check)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Staying on the wallet's current network");
                None
            }
        }
    }
}

/// Owns the wallet session. Cheap to clone; clones share one session.
///
/// Must be created inside a tokio runtime when a provider is given.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

pub(super) struct Inner {
    provider: Option<Arc<dyn WalletProvider>>,
    guard: Option<NetworkGuard>,
    target: NetworkTarget,
    config: SessionConfig,
    notices: NoticeSender,
    state: watch::Sender<Session>,
    generation: AtomicU64,
    chain_epoch: AtomicU64,
    resynced_epoch: AtomicU64,
    notified_chain: Mutex<Option<ChainId>>,
    balance_ticket: AtomicU64,
    subscriptions: Mutex<Vec<SubscriptionId>>,
    tasks: Mutex<Tasks>,
}

#[derive(Default)]
struct Tasks {
    events: Option<JoinHandle<()>>,
    refresh: Option<JoinHandle<()>>,
    network: Vec<JoinHandle<()>>,
}

impl SessionManager {
    /// `provider` is `None` when no wallet is present; `connect` then fails
    /// with `ProviderUnavailable`.
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        target: NetworkTarget,
        config: SessionConfig,
        notices: NoticeSender,
    ) -> Self {
        let guard = provider
            .clone()
            .map(|p| NetworkGuard::new(p, target.clone(), notices.clone()));
        let (state, _) = watch::channel(Session::default());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let subscriptions = match &provider {
                Some(p) => subscribe_all(p.as_ref(), weak, &events_tx),
                None => Vec::new(),
            };
            Inner {
                provider,
                guard,
                target,
                config,
                notices,
                state,
                generation: AtomicU64::new(0),
                chain_epoch: AtomicU64::new(0),
                resynced_epoch: AtomicU64::new(0),
                notified_chain: Mutex::new(None),
                balance_ticket: AtomicU64::new(0),
                subscriptions: Mutex::new(subscriptions),
                tasks: Mutex::new(Tasks::default()),
            }
        });

        if inner.provider.is_some() {
            let handle = tokio::spawn(run_event_loop(Arc::downgrade(&inner), events_rx));
            inner.tasks().events = Some(handle);
        } else {
            tracing::warn!("No wallet provider present");
        }

        Self { inner }
    }

    pub(super) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Current session snapshot.
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Observe session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Provider handle used for submissions.
    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.inner.provider.clone()
    }

    pub fn target(&self) -> &NetworkTarget {
        &self.inner.target
    }

    /// Request account access and populate the session.
    pub async fn connect(&self) -> Result<Connection, WalletError> {
        let Some(provider) = self.inner.provider.clone() else {
            tracing::warn!("Connect requested but no wallet provider is present");
            return Err(self.connect_failed(WalletError::ProviderUnavailable, "unavailable"));
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.inner.chain_epoch.load(Ordering::SeqCst);

        let accounts = provider
            .request_accounts()
            .await
            .map_err(|e| self.provider_failed(e))?;
        let Some(&account) = accounts.first() else {
            let err = WalletError::ConnectFailed("wallet returned no accounts".to_string());
            return Err(self.connect_failed(err, "no_accounts"));
        };

        let fetched_chain = provider.chain_id().await.map_err(|e| self.provider_failed(e))?;
        let mut network = self.spawn_network_check(fetched_chain);
        let mut balance = provider
            .balance(account)
            .await
            .map_err(|e| self.provider_failed(e))?;

        let mut committed = None;
        let mut chain_moved = false;
        self.inner.state.send_if_modified(|session| {
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            // A chainChanged that arrived mid-connect is newer than what we fetched.
            let current_epoch = self.inner.chain_epoch.load(Ordering::SeqCst);
            let chain_id = if current_epoch != epoch {
                chain_moved = true;
                // The follow-up below covers this epoch; the event loop skips it.
                self.inner.resynced_epoch.store(current_epoch, Ordering::SeqCst);
                self.inner.notified_chain().unwrap_or(fetched_chain)
            } else {
                fetched_chain
            };
            self.inner.balance_ticket.fetch_add(1, Ordering::SeqCst);
            *session = Session::connected(account, chain_id, balance);
            committed = Some(chain_id);
            true
        });

        let Some(chain_id) = committed else {
            tracing::info!(account = %account, "Connect superseded by a newer connect or disconnect");
            metrics::record_connect("superseded");
            return Err(WalletError::ConnectFailed(
                "connection attempt was superseded".to_string(),
            ));
        };

        self.start_refresh();

        if chain_moved {
            // The guard ran and the balance was read against the old chain.
            tracing::info!(
                fetched = %fetched_chain,
                chain_id = %chain_id,
                "Chain changed during connect, re-checking network"
            );
            network = self.spawn_network_check(chain_id);
            if let Some(refreshed) = self.refresh_balance().await {
                balance = refreshed;
            }
        }

        metrics::record_connect("connected");
        tracing::info!(
            account = %account,
            chain_id = %chain_id,
            balance = %balance,
            "Wallet connected"
        );

        Ok(Connection {
            account,
            chain_id,
            balance,
            network,
        })
    }

    /// Reconnect without prompting if the wallet already authorized an account.
    pub async fn restore(&self) -> Result<Option<Connection>, WalletError> {
        let Some(provider) = self.inner.provider.clone() else {
            return Ok(None);
        };

        match provider.accounts().await {
            Ok(accounts) if !accounts.is_empty() => self.connect().await.map(Some),
            Ok(_) => {
                tracing::debug!("No previously authorized accounts");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read authorized accounts");
                Ok(None)
            }
        }
    }

    /// Clear the session locally. Never calls the provider.
    pub fn disconnect(&self) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.balance_ticket.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.inner.tasks().refresh.take() {
            handle.abort();
        }
        if self.inner.state.send_if_modified(Session::clear) {
            tracing::info!("Wallet disconnected");
        }
    }

    /// Re-query the balance. Returns the committed value, or `None` when not
    /// connected, when the query failed, or when a newer query superseded it.
    pub async fn refresh_balance(&self) -> Option<U256> {
        let account = self.inner.state.borrow().account()?;
        let provider = self.inner.provider.clone()?;
        let ticket = self.inner.balance_ticket.fetch_add(1, Ordering::SeqCst) + 1;

        let balance = match provider.balance(account).await {
            Ok(balance) => balance,
            Err(e) => {
                tracing::warn!(account = %account, error = %e, "Balance refresh failed");
                metrics::record_balance_refresh("error");
                return None;
            }
        };

        let mut current = false;
        self.inner.state.send_if_modified(|session| {
            current = self.inner.balance_ticket.load(Ordering::SeqCst) == ticket
                && session.account() == Some(account);
            current && session.set_balance(balance)
        });

        if current {
            metrics::record_balance_refresh("ok");
            tracing::debug!(account = %account, balance = %balance, "Balance refreshed");
            Some(balance)
        } else {
            metrics::record_balance_refresh("stale");
            tracing::debug!(account = %account, "Discarding stale balance response");
            None
        }
    }

    /// Unsubscribe from the provider and stop every background task.
    ///
    /// No callback runs after this returns. The manager is not meant to be
    /// reused afterwards.
    pub async fn shutdown(&self) {
        for handle in self.inner.teardown() {
            let _ = handle.await;
        }
        tracing::info!("Session manager shut down");
    }

    /// Synchronous part of a provider notification, run inside the handler.
    fn apply_event(&self, event: &ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    tracing::info!("Wallet reported no accounts");
                    self.disconnect();
                }
                Some(&account) => {
                    if self.inner.state.send_if_modified(|s| s.set_account(account)) {
                        tracing::info!(account = %account, "Active account changed");
                    }
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                *self.inner.lock_notified() = Some(*chain_id);
                self.inner.chain_epoch.fetch_add(1, Ordering::SeqCst);
                if self.inner.state.send_if_modified(|s| s.set_chain_id(*chain_id)) {
                    tracing::info!(chain_id = %chain_id, "Chain changed");
                }
            }
        }
    }

    /// Re-run the connect sequence without prompting after a chain change.
    async fn resync(&self, notified: ChainId) {
        if !self.session().is_connected() {
            return;
        }
        let Some(provider) = self.inner.provider.clone() else {
            return;
        };
        let epoch = self.inner.chain_epoch.load(Ordering::SeqCst);
        if self.inner.resynced_epoch.swap(epoch, Ordering::SeqCst) == epoch {
            tracing::debug!(chain_id = %notified, "Chain change already handled");
            return;
        }
        let generation = self.inner.generation.load(Ordering::SeqCst);
        tracing::info!(chain_id = %notified, "Resynchronising session after chain change");

        match provider.accounts().await {
            Ok(accounts) => match accounts.first() {
                Some(&account) => {
                    self.inner.state.send_if_modified(|s| {
                        self.inner.generation.load(Ordering::SeqCst) == generation
                            && s.set_account(account)
                    });
                }
                None => {
                    if self.inner.generation.load(Ordering::SeqCst) == generation {
                        self.disconnect();
                    }
                    return;
                }
            },
            Err(e) => tracing::warn!(error = %e, "Could not re-read accounts after chain change"),
        }

        let chain_id = self.session().chain_id().unwrap_or(notified);
        // Fire-and-forget, as in connect.
        drop(self.spawn_network_check(chain_id));
        self.refresh_balance().await;
    }

    fn spawn_network_check(&self, chain_id: ChainId) -> NetworkCheckHandle {
        let (tx, rx) = oneshot::channel();
        let guard = self.inner.guard.clone();

        let handle = tokio::spawn(async move {
            let outcome = match guard {
                Some(guard) => guard.ensure_network(chain_id).await,
                None => Ok(NetworkCheck::OnTarget),
            };
            let _ = tx.send(outcome);
        });

        let mut tasks = self.inner.tasks();
        tasks.network.retain(|h| !h.is_finished());
        tasks.network.push(handle);

        NetworkCheckHandle { rx }
    }

    fn start_refresh(&self) {
        let mut tasks = self.inner.tasks();
        if tasks.refresh.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let period = Duration::from_secs(self.inner.config.balance_refresh_secs.max(1));
        tasks.refresh = Some(refresh::spawn_periodic_refresh(
            Arc::downgrade(&self.inner),
            period,
        ));
    }

    fn provider_failed(&self, error: ProviderError) -> WalletError {
        tracing::warn!(error = %error, "Wallet connection failed");
        match error {
            ProviderError::UserRejected => self.connect_failed(WalletError::UserRejected, "rejected"),
            other => self.connect_failed(WalletError::ConnectFailed(other.to_string()), "error"),
        }
    }

    fn connect_failed(&self, error: WalletError, outcome: &'static str) -> WalletError {
        metrics::record_connect(outcome);
        self.inner.notices.error(error.to_string());
        error
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("session", &*self.inner.state.borrow())
            .field("has_provider", &self.inner.provider.is_some())
            .field("target", &self.inner.target.chain_id)
            .finish()
    }
}

impl Inner {
    fn tasks(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_notified(&self) -> MutexGuard<'_, Option<ChainId>> {
        self.notified_chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notified_chain(&self) -> Option<ChainId> {
        *self.lock_notified()
    }

    /// Unsubscribe and abort everything. Returns the aborted handles.
    fn teardown(&self) -> Vec<JoinHandle<()>> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.balance_ticket.fetch_add(1, Ordering::SeqCst);

        let ids: Vec<SubscriptionId> = std::mem::take(
            &mut *self.subscriptions.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if let Some(provider) = &self.provider {
            for id in ids {
                provider.unsubscribe(id);
            }
        }

        let mut tasks = self.tasks();
        let mut handles: Vec<JoinHandle<()>> = tasks.network.drain(..).collect();
        handles.extend(tasks.refresh.take());
        handles.extend(tasks.events.take());
        for handle in &handles {
            handle.abort();
        }
        handles
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn subscribe_all(
    provider: &dyn WalletProvider,
    weak: &Weak<Inner>,
    events_tx: &mpsc::UnboundedSender<ProviderEvent>,
) -> Vec<SubscriptionId> {
    [EventKind::AccountsChanged, EventKind::ChainChanged]
        .into_iter()
        .map(|kind| {
            let weak = weak.clone();
            let events_tx = events_tx.clone();
            let handler: EventHandler = Arc::new(move |event: &ProviderEvent| {
                if let Some(inner) = weak.upgrade() {
                    SessionManager::from_inner(inner).apply_event(event);
                }
                let _ = events_tx.send(event.clone());
            });
            provider.subscribe(kind, handler)
        })
        .collect()
}

/// Asynchronous follow-ups to provider notifications.
async fn run_event_loop(session: Weak<Inner>, mut events: mpsc::UnboundedReceiver<ProviderEvent>) {
    while let Some(event) = events.recv().await {
        let Some(inner) = session.upgrade() else {
            break;
        };
        let manager = SessionManager::from_inner(inner);
        match event {
            ProviderEvent::AccountsChanged(accounts) if !accounts.is_empty() => {
                manager.refresh_balance().await;
            }
            ProviderEvent::AccountsChanged(_) => {}
            ProviderEvent::ChainChanged(chain_id) => manager.resync(chain_id).await,
        }
    }
    tracing::debug!("Session event loop stopped");
}
