use crate::config::Config;
use crate::error::AnalysisError;
use crate::image_client::{ImageClient, encode_image};
use crate::llm_client::LlmClient;
use crate::models::{AnalysisResponse, DescribeImageRequest};
use crate::request_id::{self, RequestId};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub image_client: Arc<ImageClient>,
    pub llm_client: Arc<LlmClient>,
}

impl AppState {
    pub fn new(config: Arc<RwLock<Config>>, http_client: Arc<reqwest::Client>) -> Self {
        Self {
            config,
            image_client: Arc::new(ImageClient::new(http_client.clone())),
            llm_client: Arc::new(LlmClient::new(http_client)),
        }
    }
}

pub fn app(app_state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", post(describe_image))
        .route("/describeimage", post(describe_image))
        .route("/health", get(|| async { "OK" }))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(axum::middleware::from_fn(request_id::inject_request_id))
        // Outermost, so errors and timeouts carry the CORS headers too
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[axum_macros::debug_handler]
pub async fn describe_image(
    State(app_state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> Response {
    debug!("describeimage invoked with body: {}", String::from_utf8_lossy(&body));

    match analyze(&app_state, &request_id, &body).await {
        Ok(analysis) => {
            info!("Analysis generated ({} chars)", analysis.len());
            debug!("analysis: {}", analysis);
            (StatusCode::OK, Json(AnalysisResponse::new(analysis))).into_response()
        }
        Err(e) => {
            match &e {
                AnalysisError::InvalidArgument => warn!("Missing imageUrl in request body"),
                _ => error!(error = ?e, "Image captioning failed: {}", e),
            }
            e.into_response()
        }
    }
}

async fn analyze(
    app_state: &AppState,
    request_id: &RequestId,
    body: &[u8],
) -> Result<String, AnalysisError> {
    let image_url = DescribeImageRequest::image_url_from_body(body)?;

    let image = app_state
        .image_client
        .fetch(&image_url)
        .await
        .map_err(AnalysisError::UpstreamFetch)?;
    info!("Image fetched, converting to base64");
    let image_base64 = encode_image(&image);

    // Clone out so the lock is not held across the upstream call
    let config = app_state.config.read().await.clone();
    let api_key = config.api_key()?;

    app_state
        .llm_client
        .analyze_image(&config.gemini, api_key, image_base64, request_id)
        .await
        .map_err(AnalysisError::UpstreamApi)
}
