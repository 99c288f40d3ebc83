/// Send orchestration
///
/// Resolves the credential, builds the message and performs exactly one
/// remote send per call. No retries: every failure is returned to the caller
/// as a [`SendError`] so it can decide whether to call again.
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::credentials::CredentialResolver;
use crate::errors::{ConfigError, SendError};
use crate::message::MessageBuilder;
use crate::models::{NotificationRequest, SendMessageRequest, SendResult};
use crate::options::{non_blank, FirebaseOptions};
use crate::transport::TransportFactory;

/// Sends messages through the Firebase Cloud Messaging API
pub struct FcmSender {
    project_id: String,
    default_device_token: Option<String>,
    credentials: Arc<CredentialResolver>,
    builder: MessageBuilder,
    transports: Arc<dyn TransportFactory>,
}

impl FcmSender {
    /// Create a sender for `options.project_id`.
    ///
    /// Fails with [`ConfigError::MissingProjectId`] when the project id is blank.
    pub fn new(
        options: &FirebaseOptions,
        credentials: Arc<CredentialResolver>,
        transports: Arc<dyn TransportFactory>,
    ) -> Result<Self, ConfigError> {
        let project_id = non_blank(Some(options.project_id.as_str()))
            .ok_or(ConfigError::MissingProjectId)?
            .trim()
            .to_string();

        Ok(Self {
            project_id,
            default_device_token: options.default_device_token.clone(),
            credentials,
            builder: MessageBuilder::new(),
            transports,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Send a single notification.
    ///
    /// Cancellation is checked before credential resolution and again before
    /// the remote call; an in-flight call is left to the transport.
    pub async fn send(
        &self,
        request: &NotificationRequest,
        cancel: &CancellationToken,
    ) -> Result<SendResult, SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        let credential = self.credentials.get_credential(cancel).await?;
        let transport = self.transports.create(credential);

        let message = self
            .builder
            .build(request, self.default_device_token.as_deref())
            .map_err(|e| {
                error!(error = %e, "Failed to create FCM message payload");
                e
            })?;

        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        let project_path = format!("projects/{}", self.project_id);
        let send_request = SendMessageRequest {
            message,
            validate_only: request.validate_only,
        };

        match transport.send(&project_path, &send_request, cancel).await {
            Ok(response) => {
                let message_name = response.name.unwrap_or_default();

                info!(
                    message_name = %message_name,
                    validate_only = request.validate_only,
                    project_id = %self.project_id,
                    "FCM message sent"
                );

                Ok(SendResult {
                    message_name,
                    validate_only: request.validate_only,
                    response: response.raw,
                })
            }
            Err(e) => {
                error!(
                    error = %e,
                    project_id = %self.project_id,
                    status = ?e.status(),
                    "Firebase returned an error while sending the message"
                );
                Err(e.into())
            }
        }
    }
}
