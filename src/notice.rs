//! Typed user notices (the toast channel).

use std::fmt;

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
    Success,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Info => "info",
            Self::Error => "error",
            Self::Success => "success",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Sending half of the notice channel.
///
/// Sending never fails: with no receiver (or a dropped one) notices are only logged.
#[derive(Debug, Clone, Default)]
pub struct NoticeSender {
    tx: Option<mpsc::UnboundedSender<Notice>>,
}

impl NoticeSender {
    /// Create a connected sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that only logs.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Error, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(NoticeLevel::Success, message.into());
    }

    fn send(&self, level: NoticeLevel, message: String) {
        tracing::debug!(%level, message = %message, "Notice");
        if let Some(tx) = &self.tx {
            let _ = tx.send(Notice { level, message });
        }
    }
}
