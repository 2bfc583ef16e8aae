use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};
use serde_json::json;
use log::warn;
use crate::web::handlers;

// Rejected bodies and queries answer with the same JSON error shape as handlers
fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Display + std::fmt::Debug + 'static,
{
    let message = err.to_string();
    warn!("Rejected malformed request: {}", message);
    InternalError::from_response(err, HttpResponse::BadRequest().json(json!({ "error": message }))).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _req| bad_request(err)));

    cfg.service(
        web::scope("/api")
            .route("/plan", web::post().to(handlers::generate_plan))
            .route("/translate", web::post().to(handlers::translate_plan))
            .route("/session/{session_id}/download", web::get().to(handlers::download_plan))
    )
    .route("/", web::get().to(handlers::index))
    .route("/health", web::get().to(handlers::health_check));
}
