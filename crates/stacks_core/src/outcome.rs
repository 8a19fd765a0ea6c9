use std::fmt;

use crate::JobId;

/// Where an enqueue request originated; sent to the server as `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceTag {
    SearchPage,
    DetailPage,
    Cli,
}

impl SourceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::SearchPage => "search-page",
            SourceTag::DetailPage => "detail-page",
            SourceTag::Cli => "cli",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRequest {
    pub job_id: JobId,
    pub source: SourceTag,
}

/// Parsed body of the enqueue endpoint.
///
/// `success == false` is a normal outcome (for instance "already queued"),
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueResponse {
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl QueueResponse {
    /// Human-readable text the server attached, preferring `error`.
    pub fn server_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticResponse {
    pub queue_size: u64,
    pub recent_history_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueErrorKind {
    /// No API key configured; no request was made.
    CredentialMissing,
    /// HTTP 401 or 403.
    Auth,
    Network,
    Timeout,
    /// Response body did not have the expected shape.
    Protocol,
}

impl QueueErrorKind {
    /// Notification text shown on a control failure.
    pub fn user_message(self) -> &'static str {
        match self {
            QueueErrorKind::CredentialMissing => {
                "API key not configured. Get it from the Stacks web interface (Settings tab → API Key section), then open Stacks Settings."
            }
            QueueErrorKind::Auth => {
                "Invalid API key. Get a new key from web interface → Settings."
            }
            QueueErrorKind::Network => "Failed to connect to Stacks server",
            QueueErrorKind::Timeout => "Request timed out",
            QueueErrorKind::Protocol => "Failed to parse response",
        }
    }
}

impl fmt::Display for QueueErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueErrorKind::CredentialMissing => write!(f, "credential missing"),
            QueueErrorKind::Auth => write!(f, "auth error"),
            QueueErrorKind::Network => write!(f, "network error"),
            QueueErrorKind::Timeout => write!(f, "timeout"),
            QueueErrorKind::Protocol => write!(f, "protocol error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct QueueError {
    pub kind: QueueErrorKind,
    pub message: String,
}

impl QueueError {
    pub fn new(kind: QueueErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
