use crate::error::{AppError, Result};
use crate::models::{SendNotificationRequest, SendNotificationResponse};
/// Notification send handler
use actix_web::{web, HttpResponse};
use fcm_core::FcmSender;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Send a single FCM message to a token, topic or condition
///
/// POST /api/notifications/send
pub async fn send_notification(
    sender: web::Data<Arc<FcmSender>>,
    req: web::Json<SendNotificationRequest>,
) -> Result<HttpResponse> {
    let payload = req.into_inner();

    let errors = payload.field_errors();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    // Dropping this future (client went away) cancels the send
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let request = payload.into_domain();
    let span = info_span!("send_notification", request_id = %Uuid::new_v4());

    let result = sender.send(&request, &cancel).instrument(span).await?;

    Ok(HttpResponse::Ok().json(SendNotificationResponse::from(result)))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notifications").route("/send", web::post().to(send_notification)),
    );
}

/// Maps JSON extraction failures to the standard error body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
