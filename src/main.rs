//! bnb-transfer
//!
//! Drives the wallet session and transfer core from the command line, using a
//! local private key and JSON-RPC endpoints as the wallet.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI ──▶ SessionManager ──▶ WalletProvider (RpcWalletProvider)
//!    │           │   ▲                 │
//!    │           │   └── accountsChanged / chainChanged
//!    │           ▼
//!    │      NetworkGuard (switch / add BNB Smart Chain)
//!    │
//!    └──▶ TransferSubmitter ──▶ send_transfer → wait_for_receipt → refresh
//!
//!   notices ──▶ stdout
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use bnb_transfer::config::{load_config, AppConfig};
use bnb_transfer::format::{format_balance, shorten_address};
use bnb_transfer::lifecycle::{spawn_signal_listener, Shutdown};
use bnb_transfer::observability::logging;
use bnb_transfer::provider::{LocalSigner, RpcWalletProvider, WalletProvider};
use bnb_transfer::{
    NetworkTarget, Notice, NoticeSender, Session, SessionManager, TransferSubmitter,
};

#[derive(Parser)]
#[command(name = "bnb-transfer", version, about = "Send BNB on BNB Smart Chain")]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Connect and print account, network and balance
    Status,
    /// Send native BNB
    Send {
        /// Recipient address (0x + 40 hex digits)
        #[arg(long)]
        to: String,
        /// Amount in BNB, e.g. 0.25
        #[arg(long)]
        amount: String,
    },
    /// Print balance updates until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bnb-transfer starting");

    let (notices, notice_rx) = NoticeSender::channel();
    let printer = tokio::spawn(print_notices(notice_rx));

    let provider = build_provider(&config).await;
    let session = SessionManager::new(
        provider,
        NetworkTarget::default(),
        config.session.clone(),
        notices.clone(),
    );

    let result = run(cli.command, &session, notices).await;

    session.shutdown().await;
    drop(session);
    // The printer ends once every sender is gone.
    let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;

    tracing::info!("Shutdown complete");
    result
}

async fn run(
    command: Command,
    session: &SessionManager,
    notices: NoticeSender,
) -> Result<(), Box<dyn std::error::Error>> {
    let connection = session.connect().await?;
    println!(
        "Connected {} on chain {}",
        shorten_address(&connection.account.to_string()),
        connection.chain_id
    );

    match command {
        Command::Status => {
            connection.network.finish().await;
            print_session(&session.session());
        }
        Command::Send { to, amount } => {
            // A failed switch is not fatal; the transfer goes to the active chain.
            connection.network.finish().await;
            let submitter = TransferSubmitter::new(session.clone(), notices);
            let tx_hash = submitter.submit(&to, &amount).await?;
            println!("Explorer: {}", submitter.explorer_url(&tx_hash));
            print_session(&session.session());
        }
        Command::Watch => {
            drop(connection.network);
            print_session(&session.session());

            let shutdown = Shutdown::new();
            let mut stop = shutdown.subscribe();
            let signals = spawn_signal_listener(shutdown);
            let mut updates = session.subscribe();

            loop {
                tokio::select! {
                    changed = updates.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let snapshot = updates.borrow_and_update().clone();
                        print_session(&snapshot);
                    }
                    _ = stop.recv() => break,
                }
            }
            signals.abort();
        }
    }

    Ok(())
}

async fn build_provider(config: &AppConfig) -> Option<Arc<dyn WalletProvider>> {
    let signer = match LocalSigner::from_env() {
        Ok(signer) => signer,
        Err(e) => {
            tracing::warn!(error = %e, "No signing key available");
            return None;
        }
    };

    match RpcWalletProvider::connect(&config.rpc, signer).await {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            tracing::error!(error = %e, rpc_url = %config.rpc.url, "RPC endpoint unreachable");
            None
        }
    }
}

fn print_session(session: &Session) {
    match (session.account(), session.chain_id()) {
        (Some(account), Some(chain_id)) => println!(
            "{}  chain {}  balance {} BNB",
            shorten_address(&account.to_string()),
            chain_id,
            format_balance(session.balance())
        ),
        _ => println!("Disconnected"),
    }
}

async fn print_notices(mut rx: mpsc::UnboundedReceiver<Notice>) {
    while let Some(notice) = rx.recv().await {
        println!("[{}] {}", notice.level, notice.message);
    }
}
