use std::path::PathBuf;
use thiserror::Error;

/// Invalid sender configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Firebase project id must not be blank")]
    MissingProjectId,
}

/// Credential resolution errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(
        "Firebase credentials were not found. Configure firebase.credentials or set \
         GOOGLE_APPLICATION_CREDENTIALS / GOOGLE_APPLICATION_CREDENTIALS_JSON."
    )]
    MissingConfiguration,

    #[error("Firebase service account file was not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Failed to parse service account credentials: {0}")]
    ParseFailure(String),

    #[error("Credential resolution cancelled")]
    Cancelled,
}

/// Message construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error(
        "At least one of token, topic, condition or a configured default device token must be provided."
    )]
    NoTarget,
}

/// Errors reported by the push transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("FCM API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("FCM send request failed: {0}")]
    Request(String),

    #[error("Failed to get access token: {0}")]
    Auth(String),

    #[error("FCM send request cancelled")]
    Cancelled,
}

impl TransportError {
    /// HTTP status reported by the remote API, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether calling again later could plausibly succeed.
    ///
    /// Nothing in this crate acts on it; callers own the retry decision.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Api { status, .. } => *status == 429 || *status >= 500,
            TransportError::Request(_) => true,
            TransportError::Auth(_) | TransportError::Cancelled => false,
        }
    }
}

/// Errors surfaced by [`crate::FcmSender::send`]
#[derive(Error, Debug)]
pub enum SendError {
    #[error(transparent)]
    Credential(CredentialError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Transport(TransportError),

    #[error("Send cancelled")]
    Cancelled,
}

impl From<CredentialError> for SendError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Cancelled => SendError::Cancelled,
            other => SendError::Credential(other),
        }
    }
}

impl From<TransportError> for SendError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => SendError::Cancelled,
            other => SendError::Transport(other),
        }
    }
}
