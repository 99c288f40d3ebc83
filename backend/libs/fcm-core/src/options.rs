use serde::{Deserialize, Serialize};

/// Firebase integration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebaseOptions {
    /// Firebase project id, e.g. `my-firebase-project`
    #[serde(default)]
    pub project_id: String,

    /// Device token used when a request names no target
    #[serde(default)]
    pub default_device_token: Option<String>,

    #[serde(default)]
    pub credentials: CredentialOptions,
}

/// Service account sources, checked before the `GOOGLE_APPLICATION_CREDENTIALS*` fallbacks
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialOptions {
    /// Absolute or relative path to a service account JSON file
    #[serde(default)]
    pub file_path: Option<String>,

    /// Raw service account JSON
    #[serde(default)]
    pub json: Option<String>,

    /// Base64-encoded service account JSON
    #[serde(default)]
    pub json_base64: Option<String>,
}

impl std::fmt::Debug for CredentialOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialOptions")
            .field("file_path", &self.file_path)
            .field("json", &self.json.as_ref().map(|_| "<redacted>"))
            .field("json_base64", &self.json_base64.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Returns the value when it holds something other than whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
