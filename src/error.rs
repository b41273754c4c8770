use crate::gemini::GeminiErrorResponse;
use crate::models::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

/// Every way a describe-image call can fail.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid argument: Missing imageUrl in the request body.")]
    InvalidArgument,

    #[error("Server configuration error: API key is missing.")]
    MissingApiKey,

    /// The image host could not be reached or refused the download.
    #[error("{0}")]
    UpstreamFetch(#[source] UpstreamError),

    /// The generation API call failed.
    #[error("{0}")]
    UpstreamApi(#[source] UpstreamError),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidArgument => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error.message` field of the response.
    pub fn client_message(&self) -> String {
        match self {
            AnalysisError::InvalidArgument => self.to_string(),
            other => format!("Image captioning failed: {}", other),
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.client_message()))).into_response()
    }
}

/// Failure of a single outbound HTTP call.
#[derive(Debug)]
pub enum UpstreamError {
    Transport(reqwest::Error),
    Status {
        status: reqwest::StatusCode,
        // `error.message` from the response body, when it had one
        message: Option<String>,
    },
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Transport(e) => write!(f, "{}", e),
            UpstreamError::Status {
                message: Some(message),
                ..
            } => f.write_str(message),
            UpstreamError::Status { status, .. } => {
                write!(f, "Request failed with status code {}", status.as_u16())
            }
        }
    }
}

impl std::error::Error for UpstreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpstreamError::Transport(e) => Some(e),
            UpstreamError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e)
    }
}

impl UpstreamError {
    /// Passes a successful response through; turns anything else into `Status`
    /// without looking at the body.
    pub fn check_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(UpstreamError::Status {
            status,
            message: None,
        })
    }

    /// Like [`check_status`](Self::check_status), but keeps the API's own
    /// `error.message` when the failed response body carries one.
    pub async fn check_api_status(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        Err(UpstreamError::Status {
            status,
            message: GeminiErrorResponse::message_from_body(&body),
        })
    }

    /// Transport error with its request URL dropped, for calls whose URL carries a secret.
    pub fn redacted(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e.without_url())
    }
}
