use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use fcm_core::{CredentialResolver, FcmSender, HttpTransportFactory};
use fcm_sender_service::Config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing();

    config.validate()?;

    tracing::info!(
        project_id = %config.firebase.project_id,
        default_device_token = config.firebase.default_device_token.is_some(),
        "Starting FCM sender service"
    );

    let credentials = Arc::new(CredentialResolver::new(config.firebase.credentials.clone()));
    let sender = FcmSender::new(
        &config.firebase,
        credentials,
        Arc::new(HttpTransportFactory::new()),
    )
    .context("Failed to create FCM sender")?;
    let sender = Arc::new(sender);

    let addr = config.bind_address();
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(sender.clone()))
            .wrap(middleware::Logger::default())
            .configure(fcm_sender_service::configure)
    })
    .bind(&addr)
    .with_context(|| format!("Failed to bind {}", addr))?
    .run()
    .await?;

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
