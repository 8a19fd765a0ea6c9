use std::time::Duration;

use agent_logging::{agent_debug, agent_warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use stacks_core::{
    Config, DiagnosticResponse, QueueError, QueueErrorKind, QueueRequest, QueueResponse,
};

pub const ENQUEUE_PATH: &str = "/api/queue/add";
pub const STATUS_PATH: &str = "/api/status";
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    /// Upper bound for one request, body included.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(8),
        }
    }
}

/// Requests against the queue server. Implementations never retry.
#[async_trait::async_trait]
pub trait QueueClient: Send + Sync {
    async fn enqueue(&self, request: &QueueRequest) -> Result<QueueResponse, QueueError>;

    async fn diagnose(
        &self,
        server_address: &str,
        api_key: &str,
    ) -> Result<DiagnosticResponse, QueueError>;
}

#[derive(Serialize)]
struct AddRequestBody<'a> {
    md5: &'a str,
    source: &'a str,
}

#[derive(Deserialize)]
struct AddResponseBody {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponseBody {
    queue_size: u64,
    recent_history: Vec<serde_json::Value>,
}

/// Queue client bound to the server address and key it was built with.
#[derive(Debug, Clone)]
pub struct ReqwestQueueClient {
    server_address: String,
    api_key: String,
    client: reqwest::Client,
}

impl ReqwestQueueClient {
    pub fn new(config: &Config, settings: &ClientSettings) -> Result<Self, QueueError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| QueueError::new(QueueErrorKind::Network, err.to_string()))?;
        Ok(Self {
            server_address: config.server_address.trim().to_string(),
            api_key: config.api_key.trim().to_string(),
            client,
        })
    }

    async fn send_checked(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, Vec<u8>), QueueError> {
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(QueueError::new(
                QueueErrorKind::Auth,
                format!("server rejected the API key ({status})"),
            ));
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok((status, body.to_vec()))
    }
}

#[async_trait::async_trait]
impl QueueClient for ReqwestQueueClient {
    async fn enqueue(&self, request: &QueueRequest) -> Result<QueueResponse, QueueError> {
        require_credential(&self.api_key)?;
        let url = endpoint(&self.server_address, ENQUEUE_PATH)?;
        let body = serde_json::to_vec(&AddRequestBody {
            md5: request.job_id.as_str(),
            source: request.source.as_str(),
        })
        .map_err(|err| QueueError::new(QueueErrorKind::Protocol, err.to_string()))?;

        agent_debug!("enqueue md5={} source={}", request.job_id, request.source.as_str());
        let builder = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        let (status, bytes) = self.send_checked(builder).await?;

        // Non-2xx answers with a well-formed body (e.g. 400 "Invalid MD5
        // format") are passed through like any other soft failure.
        let parsed: AddResponseBody = serde_json::from_slice(&bytes).map_err(|err| {
            agent_warn!("unparseable enqueue response (status {}): {}", status, err);
            QueueError::new(
                QueueErrorKind::Protocol,
                format!("status {status}: {err}"),
            )
        })?;
        Ok(QueueResponse {
            success: parsed.success,
            error: parsed.error,
            message: parsed.message,
        })
    }

    async fn diagnose(
        &self,
        server_address: &str,
        api_key: &str,
    ) -> Result<DiagnosticResponse, QueueError> {
        let api_key = api_key.trim();
        require_credential(api_key)?;
        let url = endpoint(server_address.trim(), STATUS_PATH)?;

        let builder = self.client.get(url).header(API_KEY_HEADER, api_key);
        let (status, bytes) = self.send_checked(builder).await?;
        if !status.is_success() {
            return Err(QueueError::new(
                QueueErrorKind::Protocol,
                format!("http status {status}"),
            ));
        }
        let parsed: StatusResponseBody = serde_json::from_slice(&bytes)
            .map_err(|err| QueueError::new(QueueErrorKind::Protocol, err.to_string()))?;
        Ok(DiagnosticResponse {
            queue_size: parsed.queue_size,
            recent_history_count: parsed.recent_history.len(),
        })
    }
}

fn require_credential(api_key: &str) -> Result<(), QueueError> {
    if api_key.trim().is_empty() {
        return Err(QueueError::new(
            QueueErrorKind::CredentialMissing,
            "API key not configured",
        ));
    }
    Ok(())
}

fn endpoint(server_address: &str, path: &str) -> Result<reqwest::Url, QueueError> {
    if server_address.is_empty() {
        return Err(QueueError::new(
            QueueErrorKind::Network,
            "server address not configured",
        ));
    }
    let raw = format!("{}{}", server_address.trim_end_matches('/'), path);
    reqwest::Url::parse(&raw).map_err(|err| {
        QueueError::new(
            QueueErrorKind::Network,
            format!("invalid server address {server_address:?}: {err}"),
        )
    })
}

fn map_reqwest_error(err: reqwest::Error) -> QueueError {
    if err.is_timeout() {
        return QueueError::new(QueueErrorKind::Timeout, err.to_string());
    }
    QueueError::new(QueueErrorKind::Network, err.to_string())
}
