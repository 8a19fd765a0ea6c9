use crate::{Config, ConfigValidationError, DiagnosticResponse, QueueError, QueueErrorKind, SettingsForm};

/// Coarse result of the "Test Connection" action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Untested,
    Testing,
    MissingApiKey,
    Connected {
        queue_size: u64,
        recent_history_count: usize,
    },
    InvalidApiKey,
    ConnectionFailed {
        server_address: String,
    },
    TimedOut,
    InvalidResponse {
        detail: String,
    },
}

impl ConnectionStatus {
    pub(crate) fn from_diagnostic(
        result: Result<DiagnosticResponse, QueueError>,
        server_address: &str,
    ) -> Self {
        match result {
            Ok(response) => ConnectionStatus::Connected {
                queue_size: response.queue_size,
                recent_history_count: response.recent_history_count,
            },
            Err(err) => match err.kind {
                QueueErrorKind::CredentialMissing => ConnectionStatus::MissingApiKey,
                QueueErrorKind::Auth => ConnectionStatus::InvalidApiKey,
                QueueErrorKind::Network => ConnectionStatus::ConnectionFailed {
                    server_address: server_address.to_string(),
                },
                QueueErrorKind::Timeout => ConnectionStatus::TimedOut,
                QueueErrorKind::Protocol => ConnectionStatus::InvalidResponse {
                    detail: err.message,
                },
            },
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(
            self,
            ConnectionStatus::Untested | ConnectionStatus::Testing | ConnectionStatus::Connected { .. }
        )
    }

    pub fn summary(&self) -> String {
        match self {
            ConnectionStatus::Untested => "Click \"Test Connection\" to verify".to_string(),
            ConnectionStatus::Testing => "Connecting...".to_string(),
            ConnectionStatus::MissingApiKey => {
                "API key required. Get it from Stacks web interface → Settings".to_string()
            }
            ConnectionStatus::Connected {
                queue_size,
                recent_history_count,
            } => format!("Connected! Queue: {queue_size}, History: {recent_history_count} items"),
            ConnectionStatus::InvalidApiKey => {
                "Invalid API key. Check your API key in web interface → Settings".to_string()
            }
            ConnectionStatus::ConnectionFailed { server_address } => {
                format!("Connection failed. Could not reach server at {server_address}")
            }
            ConnectionStatus::TimedOut => {
                "Connection timeout. Server took too long to respond".to_string()
            }
            ConnectionStatus::InvalidResponse { detail } => {
                format!("Invalid response: {detail}")
            }
        }
    }
}

/// Identifies one "Test Connection" request; results for any other id are stale.
pub type TestId = u64;

/// Editable copy of the config plus transient dialog feedback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DialogState {
    pub open: bool,
    pub form: SettingsForm,
    pub status: ConnectionStatus,
    pub validation_error: Option<ConfigValidationError>,
    /// The test whose result the dialog is waiting for.
    pub pending_test: Option<TestId>,
}

impl DialogState {
    pub(crate) fn opened_with(config: &Config) -> Self {
        Self {
            open: true,
            form: SettingsForm::from_config(config),
            status: ConnectionStatus::Untested,
            validation_error: None,
            pending_test: None,
        }
    }

    pub fn is_testing(&self) -> bool {
        self.status == ConnectionStatus::Testing
    }
}
