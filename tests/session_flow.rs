//! Session manager behaviour against a scripted wallet.

use std::time::Duration;

use alloy::primitives::U256;
use bnb_transfer::config::SessionConfig;
use bnb_transfer::provider::{ChainId, ProviderEvent};
use bnb_transfer::{NetworkCheck, NetworkTarget, NoticeLevel, NoticeSender, Session, SessionManager, WalletError};

mod common;

use common::{account, bnb, drain, other_account, session_with, settle, FakeProvider};

#[tokio::test]
async fn test_connect_populates_session() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);

    let connection = session.connect().await.unwrap();
    assert_eq!(connection.account, account());
    assert_eq!(connection.chain_id, ChainId(0x38));
    assert_eq!(connection.balance, bnb(5));
    assert_eq!(connection.network.outcome().await, Ok(NetworkCheck::OnTarget));

    let snapshot = session.session();
    assert!(snapshot.is_connected());
    assert_eq!(snapshot.account(), Some(account()));
    assert_eq!(snapshot.chain_id(), Some(ChainId(0x38)));
    assert_eq!(snapshot.balance(), bnb(5));
    assert_eq!(fake.calls("request_accounts"), 1);
}

#[tokio::test]
async fn test_observers_never_see_partial_session() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    let mut updates = session.subscribe();

    session.connect().await.unwrap();

    assert!(updates.has_changed().unwrap());
    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.account(), Some(account()));
    assert_eq!(snapshot.chain_id(), Some(ChainId(0x38)));
    assert_eq!(snapshot.balance(), bnb(5));
}

#[tokio::test]
async fn test_connect_without_provider() {
    let (notices, mut rx) = NoticeSender::channel();
    let session = SessionManager::new(None, NetworkTarget::default(), SessionConfig::default(), notices);

    let err = session.connect().await.unwrap_err();
    assert_eq!(err, WalletError::ProviderUnavailable);
    assert_eq!(session.session(), Session::default());

    let notices = drain(&mut rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, WalletError::ProviderUnavailable.to_string());
}

#[tokio::test]
async fn test_connect_rejected_by_user() {
    let fake = FakeProvider::new(bnb(5));
    fake.state().reject_connect = true;
    let (session, mut rx) = session_with(&fake);

    let err = session.connect().await.unwrap_err();
    assert_eq!(err, WalletError::UserRejected);
    assert_eq!(session.session(), Session::default());
    assert_eq!(fake.calls("chain_id"), 0);
    assert_eq!(fake.calls("balance"), 0);
    assert_eq!(drain(&mut rx).len(), 1);
}

#[tokio::test]
async fn test_connect_with_no_accounts_fails() {
    let fake = FakeProvider::new(bnb(5));
    fake.state().accounts.clear();
    let (session, _notices) = session_with(&fake);

    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, WalletError::ConnectFailed(_)));
    assert!(!session.session().is_connected());
}

#[tokio::test]
async fn test_disconnect_then_refresh_is_noop() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    session.disconnect();
    assert_eq!(session.session(), Session::default());

    let balance_calls = fake.calls("balance");
    assert_eq!(session.refresh_balance().await, None);
    assert_eq!(fake.calls("balance"), balance_calls);
    assert_eq!(session.session(), Session::default());
}

#[tokio::test]
async fn test_chain_change_during_connect_wins() {
    let fake = FakeProvider::new(bnb(5));
    fake.state().chain_change_during_chain_id = Some(ChainId(0x61));
    let (session, _notices) = session_with(&fake);

    let connection = session.connect().await.unwrap();
    assert_eq!(connection.chain_id, ChainId(0x61));
    assert_eq!(session.session().chain_id(), Some(ChainId(0x61)));

    settle().await;
    assert_eq!(session.session().chain_id(), Some(ChainId(0x61)));
    assert_eq!(fake.calls("switch_chain"), 0);
}

#[tokio::test]
async fn test_chain_change_during_slow_connect_rechecks_network() {
    let fake = FakeProvider::new(bnb(5));
    fake.state().chain_change_during_chain_id = Some(ChainId(1));
    let (session, _notices) = session_with(&fake);
    let gate = fake.gate_balance();

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.connect().await })
    };
    settle().await;
    assert_eq!(fake.calls("switch_chain"), 0);

    fake.state().balance = bnb(3);
    gate.send(bnb(5)).unwrap();

    let connection = pending.await.unwrap().unwrap();
    assert_eq!(connection.chain_id, ChainId(1));
    assert_eq!(connection.balance, bnb(3));
    assert_eq!(connection.network.outcome().await, Ok(NetworkCheck::Switched));

    settle().await;
    assert_eq!(session.session().chain_id(), Some(ChainId(0x38)));
    assert_eq!(session.session().balance(), bnb(3));
    assert_eq!(fake.calls("switch_chain"), 1);
}

#[tokio::test]
async fn test_superseded_connect_does_not_commit() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    let gate = fake.gate_balance();

    let pending = {
        let session = session.clone();
        tokio::spawn(async move { session.connect().await })
    };
    settle().await;

    session.disconnect();
    gate.send(bnb(5)).unwrap();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, WalletError::ConnectFailed(_)));
    assert!(!session.session().is_connected());
}

#[tokio::test]
async fn test_empty_accounts_notification_disconnects() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.emit(ProviderEvent::AccountsChanged(vec![]));

    assert_eq!(session.session(), Session::default());
}

#[tokio::test]
async fn test_account_change_refreshes_balance() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.state().balance = bnb(2);
    fake.emit(ProviderEvent::AccountsChanged(vec![other_account()]));
    assert_eq!(session.session().account(), Some(other_account()));
    assert_eq!(session.session().balance(), U256::ZERO);

    settle().await;
    assert_eq!(session.session().balance(), bnb(2));
}

#[tokio::test]
async fn test_stale_balance_response_is_discarded() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    let first_gate = fake.gate_balance();
    let second_gate = fake.gate_balance();

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.refresh_balance().await })
    };
    settle().await;
    let second = {
        let session = session.clone();
        tokio::spawn(async move { session.refresh_balance().await })
    };
    settle().await;

    second_gate.send(bnb(7)).unwrap();
    assert_eq!(second.await.unwrap(), Some(bnb(7)));

    first_gate.send(bnb(3)).unwrap();
    assert_eq!(first.await.unwrap(), None);

    assert_eq!(session.session().balance(), bnb(7));
}

#[tokio::test]
async fn test_chain_change_resyncs_session() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.state().balance = bnb(1);
    fake.emit(ProviderEvent::ChainChanged(ChainId(0x61)));
    assert_eq!(session.session().chain_id(), Some(ChainId(0x61)));

    settle().await;
    assert_eq!(fake.calls("accounts"), 1);
    assert_eq!(fake.calls("switch_chain"), 0);
    assert_eq!(session.session().balance(), bnb(1));
}

#[tokio::test]
async fn test_chain_change_to_foreign_chain_switches_back() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.emit(ProviderEvent::ChainChanged(ChainId(1)));
    assert_eq!(session.session().chain_id(), Some(ChainId(1)));

    settle().await;
    assert_eq!(fake.calls("switch_chain"), 1);
    assert_eq!(session.session().chain_id(), Some(ChainId(0x38)));
}

#[tokio::test]
async fn test_chain_change_with_revoked_accounts_disconnects() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.state().authorized.clear();
    fake.emit(ProviderEvent::ChainChanged(ChainId(0x61)));
    settle().await;

    assert!(!session.session().is_connected());
}

#[tokio::test(start_paused = true)]
async fn test_periodic_refresh_runs_only_while_connected() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.state().balance = bnb(9);
    tokio::time::sleep(Duration::from_secs(11)).await;
    settle().await;
    assert_eq!(session.session().balance(), bnb(9));

    session.disconnect();
    let balance_calls = fake.calls("balance");
    tokio::time::sleep(Duration::from_secs(35)).await;
    settle().await;
    assert_eq!(fake.calls("balance"), balance_calls);
}

#[tokio::test]
async fn test_restore_without_authorized_accounts() {
    let fake = FakeProvider::new(bnb(5));
    fake.state().authorized.clear();
    let (session, _notices) = session_with(&fake);

    assert!(session.restore().await.unwrap().is_none());
    assert_eq!(fake.calls("request_accounts"), 0);
    assert!(!session.session().is_connected());
}

#[tokio::test]
async fn test_restore_reconnects_authorized_account() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);

    let connection = session.restore().await.unwrap().unwrap();
    assert_eq!(connection.account, account());
    assert!(session.session().is_connected());
}

#[tokio::test]
async fn test_shutdown_removes_listeners() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    assert_eq!(fake.listener_count(), 2);

    session.connect().await.unwrap();
    session.shutdown().await;

    assert_eq!(fake.listener_count(), 0);
    assert_eq!(fake.emit(ProviderEvent::ChainChanged(ChainId(1))), 0);
    assert_eq!(session.session().chain_id(), Some(ChainId(0x38)));
}

#[tokio::test]
async fn test_drop_removes_listeners() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();
    settle().await;

    drop(session);
    assert_eq!(fake.listener_count(), 0);
}

#[tokio::test]
async fn test_refresh_balance_returns_committed_value() {
    let fake = FakeProvider::new(bnb(5));
    let (session, _notices) = session_with(&fake);
    session.connect().await.unwrap();

    fake.state().balance = U256::from(123u64);
    assert_eq!(session.refresh_balance().await, Some(U256::from(123u64)));
    assert_eq!(session.session().balance(), U256::from(123u64));
}
