use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::api::handlers;
use crate::shared::config::Config;

/// Конфигурация всех роутов приложения
pub fn configure_routes(config: &Config) -> Router {
    let upload_limit = config.server.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // UseCase u501: Resolve part status
        .route(
            "/api/u501/upload",
            post(handlers::usecases::u501_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/u501/resolve/start",
            post(handlers::usecases::u501_start_resolve),
        )
        .route(
            "/api/u501/resolve/:session_id/progress",
            get(handlers::usecases::u501_get_progress),
        )
        .route(
            "/api/u501/download/result",
            get(handlers::usecases::u501_download_result),
        )
        .route(
            "/api/u501/download/snapshot",
            get(handlers::usecases::u501_download_snapshot),
        )
        .fallback_service(ServeDir::new("dist"))
}
