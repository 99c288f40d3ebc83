/// FCM Core Library
///
/// Sends single-target push notifications through the Firebase Cloud
/// Messaging HTTP v1 API.
///
/// It handles:
/// - Service account credential resolution with a per-resolver cache
/// - Target resolution and message payload construction
/// - Send orchestration with cooperative cancellation
/// - OAuth2 access tokens for the default HTTP transport

pub mod credentials;
pub mod errors;
pub mod message;
pub mod models;
pub mod options;
pub mod sender;
pub mod transport;

pub use credentials::{Credential, CredentialResolver, EnvLookup, ServiceAccountKey};
pub use errors::{BuildError, ConfigError, CredentialError, SendError, TransportError};
pub use message::MessageBuilder;
pub use models::{
    NotificationRequest, Notification, OutboundMessage, ResolvedTarget, SendMessageRequest,
    SendResult,
};
pub use options::{CredentialOptions, FirebaseOptions};
pub use sender::FcmSender;
pub use transport::{
    FcmHttpTransport, HttpTransportFactory, PushTransport, TransportFactory, TransportResponse,
};

pub use tokio_util::sync::CancellationToken;
