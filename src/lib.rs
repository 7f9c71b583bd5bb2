//! BNB Smart Chain wallet session and native-transfer library.

pub mod config;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod network;
pub mod notice;
pub mod observability;
pub mod provider;
pub mod session;
pub mod transfer;

pub use config::AppConfig;
pub use error::WalletError;
pub use network::{NetworkCheck, NetworkGuard, NetworkTarget};
pub use notice::{Notice, NoticeLevel, NoticeSender};
pub use provider::{ProviderError, WalletProvider};
pub use session::{Connection, Session, SessionManager};
pub use transfer::{TransferStatus, TransferSubmitter};
