use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::credentials::Credential;
use crate::errors::TransportError;
use crate::models::{GoogleErrorEnvelope, SendMessageRequest};

/// Production FCM HTTP v1 endpoint
pub const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/v1";

/// What the remote API returned for an accepted message
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub name: Option<String>,
    pub raw: serde_json::Value,
}

/// One remote send call
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Send `request` to `project_path` (`projects/{project_id}`).
    async fn send(
        &self,
        project_path: &str,
        request: &SendMessageRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError>;
}

/// Creates a transport session bound to a credential
pub trait TransportFactory: Send + Sync {
    fn create(&self, credential: Arc<Credential>) -> Box<dyn PushTransport>;
}

/// Builds [`FcmHttpTransport`]s sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpTransportFactory {
    pub fn new() -> Self {
        Self::with_endpoint(FCM_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HttpTransportFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, credential: Arc<Credential>) -> Box<dyn PushTransport> {
        Box::new(FcmHttpTransport {
            http_client: self.http_client.clone(),
            endpoint: self.endpoint.clone(),
            credential,
        })
    }
}

/// Firebase Cloud Messaging HTTP session
///
/// Authenticates with the credential's OAuth2 access token and posts to
/// `{endpoint}/{project_path}/messages:send`.
pub struct FcmHttpTransport {
    http_client: reqwest::Client,
    endpoint: String,
    credential: Arc<Credential>,
}

impl FcmHttpTransport {
    async fn execute(
        &self,
        project_path: &str,
        request: &SendMessageRequest,
    ) -> Result<TransportResponse, TransportError> {
        let access_token = self.credential.access_token(&self.http_client).await?;

        let url = format!("{}/{}/messages:send", self.endpoint, project_path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let raw: serde_json::Value = response
                .json()
                .await
                .map_err(|e| TransportError::Request(format!("Failed to parse FCM response: {}", e)))?;

            let name = raw
                .get("name")
                .and_then(|name| name.as_str())
                .map(str::to_owned);

            debug!(status = status.as_u16(), "FCM accepted message");
            return Ok(TransportResponse { name, raw });
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        Err(TransportError::Api {
            status: status.as_u16(),
            message: api_error_message(&error_text),
        })
    }
}

#[async_trait]
impl PushTransport for FcmHttpTransport {
    async fn send(
        &self,
        project_path: &str,
        request: &SendMessageRequest,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.execute(project_path, request) => result,
        }
    }
}

/// Extract the human-readable message from a Google API error body.
///
/// Falls back to the raw body when it is not the standard envelope.
pub fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(envelope) => match (envelope.error.status, envelope.error.message) {
            (Some(status), Some(message)) => format!("{}: {}", status, message),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => body.to_string(),
        },
        Err(_) if body.trim().is_empty() => "Unknown error".to_string(),
        Err(_) => body.to_string(),
    }
}
