//! The session snapshot published to observers.

use alloy::primitives::{Address, U256};

use crate::provider::ChainId;

/// Connection state: either fully empty or fully populated.
///
/// Fields are private so a disconnected session can never carry an account,
/// chain id or balance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    account: Option<Address>,
    chain_id: Option<ChainId>,
    balance: U256,
}

impl Session {
    pub(crate) fn connected(account: Address, chain_id: ChainId, balance: U256) -> Self {
        Self {
            account: Some(account),
            chain_id: Some(chain_id),
            balance,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// Cached balance in base units. Zero when disconnected.
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Returns true if the balance changed. Ignored while disconnected.
    pub(crate) fn set_balance(&mut self, balance: U256) -> bool {
        if !self.is_connected() || self.balance == balance {
            return false;
        }
        self.balance = balance;
        true
    }

    /// Switch to another account. The balance belonged to the previous
    /// account, so it drops to zero until the next refresh.
    pub(crate) fn set_account(&mut self, account: Address) -> bool {
        if !self.is_connected() || self.account == Some(account) {
            return false;
        }
        self.account = Some(account);
        self.balance = U256::ZERO;
        true
    }

    pub(crate) fn set_chain_id(&mut self, chain_id: ChainId) -> bool {
        if !self.is_connected() || self.chain_id == Some(chain_id) {
            return false;
        }
        self.chain_id = Some(chain_id);
        true
    }

    /// Clear everything. Returns true if the session was connected.
    pub(crate) fn clear(&mut self) -> bool {
        let was_connected = self.is_connected();
        *self = Self::default();
        was_connected
    }
}
