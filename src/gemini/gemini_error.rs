use serde::{Deserialize, Serialize};

/// Error envelope Google APIs return alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorDetail {
    pub code: Option<u16>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl GeminiErrorResponse {
    /// Pulls `error.message` out of a raw response body, if the body has one.
    pub fn message_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<GeminiErrorResponse>(body)
            .ok()
            .and_then(|resp| resp.error.message)
            .filter(|message| !message.trim().is_empty())
    }
}
