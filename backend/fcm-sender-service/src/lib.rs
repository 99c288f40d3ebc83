pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::*;

use actix_web::web;

/// Mount every route of the service.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .route("/health", web::get().to(|| async { "OK" }));
    handlers::register_routes(cfg);
}
