use fcm_core::{NotificationRequest, SendResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use validator::Validate;

/// Validation failures keyed by request field (camelCase)
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Request to send one notification
///
/// POST /api/notifications/send
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[validate(length(max = 200, message = "title must be at most 200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "body must be at most 2000 characters"))]
    pub body: Option<String>,

    #[validate(url(message = "imageUrl must be a valid URL"))]
    pub image_url: Option<String>,

    /// Device registration token, takes precedence over topic and condition
    #[validate(length(max = 4096, message = "token must be at most 4096 characters"))]
    pub token: Option<String>,

    /// Topic name without the `/topics/` prefix
    #[validate(length(max = 256, message = "topic must be at most 256 characters"))]
    pub topic: Option<String>,

    #[validate(length(max = 1024, message = "condition must be at most 1024 characters"))]
    pub condition: Option<String>,

    pub data: Option<HashMap<String, Option<String>>>,

    #[serde(default)]
    pub validate_only: bool,
}

impl SendNotificationRequest {
    /// Collect every validation failure, keyed by field.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if let Err(e) = self.validate() {
            for (field, failures) in e.field_errors() {
                let messages = failures
                    .iter()
                    .map(|failure| match &failure.message {
                        Some(message) => message.to_string(),
                        None => format!("{} is invalid", field),
                    })
                    .collect::<Vec<_>>();
                errors
                    .entry(camel_case(&field))
                    .or_default()
                    .extend(messages);
            }
        }

        if let Some(data) = &self.data {
            if data.keys().any(|key| key.trim().is_empty()) {
                errors
                    .entry("data".to_string())
                    .or_default()
                    .push("data keys must not be blank".to_string());
            }
            if data.values().any(Option::is_none) {
                errors
                    .entry("data".to_string())
                    .or_default()
                    .push("data values must not be null".to_string());
            }
        }

        errors
    }

    /// Convert into the domain request; call after [`Self::field_errors`] came back empty.
    pub fn into_domain(self) -> NotificationRequest {
        NotificationRequest {
            title: self.title.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            image_url: self.image_url,
            token: self.token,
            topic: self.topic,
            condition: self.condition,
            data: self.data.map(|data| {
                data.into_iter()
                    .filter_map(|(key, value)| value.map(|value| (key, value)))
                    .collect()
            }),
            validate_only: self.validate_only,
        }
    }
}

/// Response for a successful send
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub message_name: String,
    pub dry_run: bool,
}

impl From<SendResult> for SendNotificationResponse {
    fn from(result: SendResult) -> Self {
        Self {
            dry_run: result.is_dry_run(),
            message_name: result.message_name,
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for ch in field.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("image_url"), "imageUrl");
        assert_eq!(camel_case("title"), "title");
    }
}
