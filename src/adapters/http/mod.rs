pub mod routes;
pub mod state;
pub mod ws;

use axum::extract::DefaultBodyLimit;
use axum::handler::HandlerWithoutStateExt;
use axum::response::Response;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;

pub fn router(state: HttpState) -> Router {
    let uploads = ServeDir::new(state.inference.upload_dir())
        .not_found_service(routes::uploaded_file_missing.into_service());
    let outputs = ServeDir::new(state.inference.output_dir())
        .not_found_service(routes::static_file_missing.into_service());
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/upload", post(routes::upload_file))
        .route("/inference", post(routes::run_inference))
        .route("/api/model-info", get(routes::model_information))
        .route("/api/health", get(routes::health_check))
        .route("/api/thresholds", get(routes::get_thresholds))
        .route("/api/thresholds", post(routes::set_thresholds))
        .route("/ws", get(ws_handler))
        .nest_service("/uploads", uploads)
        .nest_service("/static", outputs)
        .fallback(routes::endpoint_not_found)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(axum::middleware::map_response(move |response: Response| async move {
            routes::normalize_payload_too_large(response, max_upload_bytes)
        }))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
