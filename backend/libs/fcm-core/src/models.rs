use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Domain-level request describing one outgoing FCM message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    /// Direct device token, takes precedence over topic and condition
    pub token: Option<String>,
    pub topic: Option<String>,
    /// Boolean expression over topics, e.g. `'news' in topics && 'kr' in topics`
    pub condition: Option<String>,
    pub data: Option<HashMap<String, String>>,
    /// When true, FCM validates the message without delivering it
    pub validate_only: bool,
}

/// The single recipient selector of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTarget {
    Token(String),
    Topic(String),
    Condition(String),
}

/// FCM Notification Payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// FCM v1 `Message` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub target: ResolvedTarget,
}

impl OutboundMessage {
    pub fn token(&self) -> Option<&str> {
        match &self.target {
            ResolvedTarget::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match &self.target {
            ResolvedTarget::Topic(topic) => Some(topic),
            _ => None,
        }
    }

    pub fn condition(&self) -> Option<&str> {
        match &self.target {
            ResolvedTarget::Condition(condition) => Some(condition),
            _ => None,
        }
    }
}

/// Body of `POST projects/{project_id}/messages:send`
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub message: OutboundMessage,
    pub validate_only: bool,
}

/// FCM Send Result
#[derive(Debug, Clone, Serialize)]
pub struct SendResult {
    /// Name assigned by FCM, e.g. `projects/demo/messages/0:1700000000`; empty if none was returned
    pub message_name: String,
    pub validate_only: bool,
    /// Raw API response, passed through untouched
    pub response: serde_json::Value,
}

impl SendResult {
    /// True when the message was only validated, not delivered.
    pub fn is_dry_run(&self) -> bool {
        self.validate_only
    }
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// OAuth2 Token Cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    pub access_token: String,
    pub expires_at: i64,
}

/// Google API error envelope
#[derive(Debug, Deserialize)]
pub struct GoogleErrorEnvelope {
    pub error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct GoogleErrorBody {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_single_target_key() {
        let message = OutboundMessage {
            notification: Some(Notification {
                title: "Hello".to_string(),
                body: "World".to_string(),
                image: None,
            }),
            data: Some(HashMap::from([("screen".to_string(), "chat".to_string())])),
            target: ResolvedTarget::Topic("news".to_string()),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["topic"], "news");
        assert!(json.get("token").is_none());
        assert!(json.get("condition").is_none());
        assert_eq!(json["notification"]["title"], "Hello");
        assert!(json["notification"].get("image").is_none());
        assert_eq!(json["data"]["screen"], "chat");
    }

    #[test]
    fn test_send_message_request_shape() {
        let request = SendMessageRequest {
            message: OutboundMessage {
                notification: None,
                data: None,
                target: ResolvedTarget::Condition("'a' in topics".to_string()),
            },
            validate_only: true,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["validate_only"], true);
        assert_eq!(json["message"]["condition"], "'a' in topics");
        assert!(json["message"].get("notification").is_none());
        assert!(json["message"].get("data").is_none());
    }

    #[test]
    fn test_send_result_dry_run() {
        let result = SendResult {
            message_name: String::new(),
            validate_only: true,
            response: serde_json::json!({}),
        };
        assert!(result.is_dry_run());
    }
}
