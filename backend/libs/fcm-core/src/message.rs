use crate::errors::BuildError;
use crate::models::{Notification, NotificationRequest, OutboundMessage, ResolvedTarget};
use crate::options::non_blank;

/// Builds [`OutboundMessage`] values from [`NotificationRequest`]s
///
/// Stateless; safe to share and call concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageBuilder;

impl MessageBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the wire message for `request`.
    ///
    /// `fallback_token` is used only when the request carries no non-blank
    /// token, topic or condition.
    pub fn build(
        &self,
        request: &NotificationRequest,
        fallback_token: Option<&str>,
    ) -> Result<OutboundMessage, BuildError> {
        let has_notification_payload = !request.title.trim().is_empty()
            || !request.body.trim().is_empty()
            || non_blank(request.image_url.as_deref()).is_some();

        let notification = has_notification_payload.then(|| Notification {
            title: request.title.clone(),
            body: request.body.clone(),
            image: request.image_url.clone(),
        });

        let data = request.data.as_ref().filter(|data| !data.is_empty()).cloned();

        Ok(OutboundMessage {
            notification,
            data,
            target: resolve_target(request, fallback_token)?,
        })
    }
}

/// Pick the single target: token, then topic, then condition, then the fallback token.
pub fn resolve_target(
    request: &NotificationRequest,
    fallback_token: Option<&str>,
) -> Result<ResolvedTarget, BuildError> {
    if let Some(token) = non_blank(request.token.as_deref()) {
        return Ok(ResolvedTarget::Token(token.to_string()));
    }

    if let Some(topic) = non_blank(request.topic.as_deref()) {
        return Ok(ResolvedTarget::Topic(topic.to_string()));
    }

    if let Some(condition) = non_blank(request.condition.as_deref()) {
        return Ok(ResolvedTarget::Condition(condition.to_string()));
    }

    non_blank(fallback_token)
        .map(|token| ResolvedTarget::Token(token.to_string()))
        .ok_or(BuildError::NoTarget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn build(request: &NotificationRequest, fallback: Option<&str>) -> Result<OutboundMessage, BuildError> {
        MessageBuilder::new().build(request, fallback)
    }

    #[test]
    fn test_token_target_with_notification_and_data() {
        let request = NotificationRequest {
            token: Some("token-123".to_string()),
            title: "Hello".to_string(),
            body: "World".to_string(),
            data: Some(HashMap::from([("key".to_string(), "value".to_string())])),
            ..Default::default()
        };

        let message = build(&request, None).unwrap();

        assert_eq!(message.target, ResolvedTarget::Token("token-123".to_string()));
        assert_eq!(message.topic(), None);
        let notification = message.notification.as_ref().unwrap();
        assert_eq!(notification.title, "Hello");
        assert_eq!(notification.body, "World");
        assert_eq!(message.data.as_ref().unwrap()["key"], "value");
    }

    #[test]
    fn test_topic_target() {
        let request = NotificationRequest {
            topic: Some("news".to_string()),
            body: "Latest updates".to_string(),
            ..Default::default()
        };

        let message = build(&request, None).unwrap();

        assert_eq!(message.target, ResolvedTarget::Topic("news".to_string()));
        assert_eq!(message.token(), None);
    }

    #[test]
    fn test_target_priority() {
        let all = NotificationRequest {
            token: Some("t".to_string()),
            topic: Some("news".to_string()),
            condition: Some("'a' in topics".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build(&all, Some("fallback")).unwrap().target,
            ResolvedTarget::Token("t".to_string())
        );

        let no_token = NotificationRequest {
            token: Some("  ".to_string()),
            ..all.clone()
        };
        assert_eq!(
            build(&no_token, Some("fallback")).unwrap().target,
            ResolvedTarget::Topic("news".to_string())
        );

        let condition_only = NotificationRequest {
            topic: None,
            ..no_token.clone()
        };
        assert_eq!(
            build(&condition_only, Some("fallback")).unwrap().target,
            ResolvedTarget::Condition("'a' in topics".to_string())
        );
    }

    #[test]
    fn test_fallback_token_used_without_explicit_target() {
        let request = NotificationRequest {
            title: "Fallback".to_string(),
            body: "Using default token".to_string(),
            ..Default::default()
        };

        let message = build(&request, Some("default-token")).unwrap();
        assert_eq!(message.token(), Some("default-token"));
    }

    #[test]
    fn test_no_target_fails() {
        let request = NotificationRequest {
            title: "Title".to_string(),
            ..Default::default()
        };

        assert_eq!(build(&request, None).unwrap_err(), BuildError::NoTarget);
        assert_eq!(build(&request, Some(" \t")).unwrap_err(), BuildError::NoTarget);
    }

    #[test]
    fn test_blank_payload_has_no_notification_block() {
        let request = NotificationRequest {
            title: "  ".to_string(),
            body: String::new(),
            image_url: Some(" ".to_string()),
            token: Some("token".to_string()),
            data: Some(HashMap::from([("k".to_string(), "v".to_string())])),
            ..Default::default()
        };

        let message = build(&request, None).unwrap();
        assert!(message.notification.is_none());
        assert!(message.data.is_some());
    }

    #[test]
    fn test_single_field_attaches_block_with_others_verbatim() {
        let request = NotificationRequest {
            image_url: Some("https://cdn.example.com/a.png".to_string()),
            title: " ".to_string(),
            token: Some("token".to_string()),
            validate_only: true,
            ..Default::default()
        };

        let notification = build(&request, None).unwrap().notification.unwrap();
        assert_eq!(notification.title, " ");
        assert_eq!(notification.body, "");
        assert_eq!(notification.image.as_deref(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_empty_data_is_omitted() {
        let request = NotificationRequest {
            token: Some("token".to_string()),
            data: Some(HashMap::new()),
            ..Default::default()
        };

        assert!(build(&request, None).unwrap().data.is_none());
    }

    #[test]
    fn test_data_keys_copied_exactly() {
        let data = HashMap::from([
            ("Key".to_string(), "upper".to_string()),
            ("key".to_string(), "lower".to_string()),
        ]);
        let request = NotificationRequest {
            topic: Some("news".to_string()),
            data: Some(data.clone()),
            ..Default::default()
        };

        assert_eq!(build(&request, None).unwrap().data, Some(data));
    }
}
