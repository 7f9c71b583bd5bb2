//! Provider change notifications and the listener registry behind
//! `subscribe`/`unsubscribe`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;

use crate::provider::types::ChainId;

/// Which notification a listener wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccountsChanged,
    ChainChanged,
}

/// A notification emitted by the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Authorized accounts changed; empty means the wallet locked or revoked access.
    AccountsChanged(Vec<Address>),
    /// The wallet's active chain changed.
    ChainChanged(ChainId),
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::AccountsChanged(_) => EventKind::AccountsChanged,
            Self::ChainChanged(_) => EventKind::ChainChanged,
        }
    }
}

/// Listener callback. Invoked synchronously on the emitting task.
pub type EventHandler = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Thread-safe set of listeners keyed by subscription id.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: DashMap<SubscriptionId, (EventKind, EventHandler)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind.
    pub fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, (kind, handler));
        tracing::debug!(?kind, subscription = id.0, "Listener registered");
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription = id.0, "Listener removed");
        }
        removed
    }

    /// Deliver an event to every matching listener. Returns how many ran.
    pub fn emit(&self, event: &ProviderEvent) -> usize {
        let kind = event.kind();
        // Collect first: a handler may unsubscribe, which needs the shard lock.
        let handlers: Vec<EventHandler> = self
            .listeners
            .iter()
            .filter(|entry| entry.value().0 == kind)
            .map(|entry| entry.value().1.clone())
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
