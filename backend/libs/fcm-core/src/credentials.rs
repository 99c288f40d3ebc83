use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::{CredentialError, TransportError};
use crate::models::{GoogleTokenResponse, JwtClaims, TokenCache};
use crate::options::{non_blank, CredentialOptions};

/// OAuth scope required by the FCM HTTP v1 API
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

pub const ENV_CREDENTIALS_JSON: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";
pub const ENV_CREDENTIALS_JSON_BASE64: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON_BASE64";
pub const ENV_CREDENTIALS_FILE: &str = "GOOGLE_APPLICATION_CREDENTIALS";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Environment variable lookup used for credential fallbacks
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Firebase Service Account Key
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Authorization handle for the FCM API
///
/// Wraps a parsed service account key together with the OAuth scopes it is
/// restricted to, and caches the access token exchanged for it.
pub struct Credential {
    key: ServiceAccountKey,
    scopes: Vec<String>,
    token_cache: Mutex<Option<TokenCache>>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &self.key)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl Credential {
    pub fn from_key(key: ServiceAccountKey) -> Self {
        Self {
            key,
            scopes: Vec::new(),
            token_cache: Mutex::new(None),
        }
    }

    /// Parse a service account key from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| CredentialError::ParseFailure(e.to_string()))?;

        if key.private_key.trim().is_empty() || key.client_email.trim().is_empty() {
            return Err(CredentialError::ParseFailure(
                "service account key must contain private_key and client_email".to_string(),
            ));
        }

        Ok(Self::from_key(key))
    }

    /// Read and parse a service account JSON file.
    pub async fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            CredentialError::ParseFailure(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::from_json(&json)
    }

    /// Restrict the credential to a single OAuth scope.
    pub fn create_scoped(mut self, scope: impl Into<String>) -> Self {
        self.scopes = vec![scope.into()];
        self
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Get an OAuth2 access token for this credential (with caching)
    ///
    /// The cache lock is held across the exchange so concurrent senders share
    /// one refresh.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, TransportError> {
        let mut cache = self.token_cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            // Still valid for at least 60 more seconds
            if cached.expires_at > Utc::now().timestamp() + 60 {
                return Ok(cached.access_token.clone());
            }
        }

        let now = Utc::now();
        let claims = JwtClaims {
            iss: self.key.client_email.clone(),
            sub: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| TransportError::Auth(format!("Failed to parse private key: {}", e)))?;

        let assertion = encode(&header, &claims, &encoding_key)
            .map_err(|e| TransportError::Auth(format!("Failed to encode JWT: {}", e)))?;

        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = http
            .post(&self.key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| TransportError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Auth(format!(
                "Token request failed with status: {}",
                response.status()
            )));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Auth(format!("Failed to parse token response: {}", e)))?;

        debug!(
            client_email = %self.key.client_email,
            expires_in = token_response.expires_in,
            "Exchanged service account assertion for access token"
        );

        *cache = Some(TokenCache {
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now().timestamp() + token_response.expires_in,
        });

        Ok(token_response.access_token)
    }
}

enum CredentialSource {
    Json(String),
    File(PathBuf),
}

/// Resolves the service account credential once and hands out the cached value afterwards
///
/// Sources, first non-blank wins:
/// 1. `options.json`
/// 2. `GOOGLE_APPLICATION_CREDENTIALS_JSON`
/// 3. `options.json_base64`
/// 4. `GOOGLE_APPLICATION_CREDENTIALS_JSON_BASE64`
/// 5. `options.file_path`
/// 6. `GOOGLE_APPLICATION_CREDENTIALS`
pub struct CredentialResolver {
    options: CredentialOptions,
    env: EnvLookup,
    cached: OnceCell<Arc<Credential>>,
}

impl CredentialResolver {
    pub fn new(options: CredentialOptions) -> Self {
        Self {
            options,
            env: process_env(),
            cached: OnceCell::new(),
        }
    }

    /// Replace the process environment as the source of fallback variables.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Return the cached credential, creating it on first use.
    ///
    /// Concurrent first callers wait on a single creation. Failures are not
    /// cached, so a later call resolves again.
    pub async fn get_credential(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<Credential>, CredentialError> {
        if cancel.is_cancelled() {
            return Err(CredentialError::Cancelled);
        }

        if let Some(credential) = self.cached.get() {
            return Ok(Arc::clone(credential));
        }

        self.cached
            .get_or_try_init(|| self.create_scoped_credential())
            .await
            .map(Arc::clone)
    }

    async fn create_scoped_credential(&self) -> Result<Arc<Credential>, CredentialError> {
        let credential = match self.resolve_source()? {
            CredentialSource::Json(json) => {
                debug!("Loading Firebase credential from JSON");
                Credential::from_json(&json)?
            }
            CredentialSource::File(path) => {
                if !matches!(tokio::fs::try_exists(&path).await, Ok(true)) {
                    return Err(CredentialError::FileNotFound { path });
                }
                debug!(path = %path.display(), "Loading Firebase credential from file");
                Credential::from_file(&path).await?
            }
        };

        let credential = credential.create_scoped(FIREBASE_MESSAGING_SCOPE);

        info!(
            client_email = %credential.key().client_email,
            "Firebase credential initialized"
        );

        Ok(Arc::new(credential))
    }

    fn resolve_source(&self) -> Result<CredentialSource, CredentialError> {
        if let Some(json) = self.setting(self.options.json.as_deref(), ENV_CREDENTIALS_JSON) {
            return Ok(CredentialSource::Json(json));
        }

        if let Some(encoded) =
            self.setting(self.options.json_base64.as_deref(), ENV_CREDENTIALS_JSON_BASE64)
        {
            let json = decode_base64_json(&encoded)?;
            if !json.trim().is_empty() {
                return Ok(CredentialSource::Json(json));
            }
        }

        let file_path = self
            .setting(self.options.file_path.as_deref(), ENV_CREDENTIALS_FILE)
            .ok_or(CredentialError::MissingConfiguration)?;

        let absolute = std::path::absolute(&file_path).map_err(|e| {
            CredentialError::ParseFailure(format!("invalid credential path {}: {}", file_path, e))
        })?;

        Ok(CredentialSource::File(normalize(&absolute)))
    }

    /// Configured value if non-blank, otherwise the non-blank environment variable.
    fn setting(&self, configured: Option<&str>, env_key: &str) -> Option<String> {
        non_blank(configured)
            .map(str::to_owned)
            .or_else(|| (self.env)(env_key).filter(|v| !v.trim().is_empty()))
    }
}

/// Fold `.` and `..` out of an absolute path without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn decode_base64_json(encoded: &str) -> Result<String, CredentialError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| CredentialError::ParseFailure(format!("invalid base64 credentials: {}", e)))?;

    String::from_utf8(bytes)
        .map_err(|e| CredentialError::ParseFailure(format!("credentials are not UTF-8: {}", e)))
}
