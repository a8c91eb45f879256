pub mod api;
pub mod config;
pub mod services;
pub mod utils;

use crate::api::handlers::docs::{DOCS_PATH, OPENAPI_PATH};
use crate::api::middleware::request_id::REQUEST_ID_HEADER;
use crate::config::AppConfig;
use crate::services::transcription::TranscriptionService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(description = "Simple REST API that transcribes audio files using AI."),
    paths(
        api::handlers::transcribe::transcribe_audio,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::transcribe::TranscribeForm,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "transcription", description = "Speech-to-text endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub transcription: Arc<TranscriptionService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_size;

    Router::new()
        .merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .route("/", get(api::handlers::docs::documentation))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/transcribe/mp3",
            post(api::handlers::transcribe::transcribe_audio),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        info!(
                            "📤 Finished in {:?} with status {}",
                            latency,
                            response.status()
                        );
                    },
                ),
        )
        // Outermost, so the trace span already sees a minted request id
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
