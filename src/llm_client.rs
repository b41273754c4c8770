use crate::config::GeminiSettings;
use crate::error::UpstreamError;
use crate::gemini::{GeminiInlineData, GeminiRequest, GeminiResponse};
use crate::request_id::{REQUEST_ID_HEADER, RequestId};
use reqwest::header::HeaderValue;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ANALYST_PROMPT: &str = "Please give a solid analysis of the day's news, based on this newspaper front page. Go through the headlines, the stories, what is says about the current state of politics, the public mood etc. Be creative. Start with \"Today's insert newspaper title here front page...\" - this must be how it starts.";

// Declared for every image, whatever format the host actually served.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

pub const NO_ANALYSIS: &str = "No analysis generated.";

#[derive(Debug)]
pub struct LlmClient {
    http_client: Arc<reqwest::Client>,
}

impl LlmClient {
    pub fn new(http_client: Arc<reqwest::Client>) -> Self {
        Self { http_client }
    }

    /// `generateContent` URL without the key, safe to log.
    fn build_target_url(settings: &GeminiSettings) -> String {
        let api_base = &settings.api_base;
        let path = format!("models/{}:generateContent", settings.model);
        if api_base.ends_with('/') {
            format!("{}{}", api_base, path)
        } else {
            format!("{}/{}", api_base, path)
        }
    }

    /// Sends the analyst prompt and the image to Gemini and returns the generated text.
    pub async fn analyze_image(
        &self,
        settings: &GeminiSettings,
        api_key: &str,
        image_base64: String,
        request_id: &RequestId,
    ) -> Result<String, UpstreamError> {
        let target_url = Self::build_target_url(settings);
        let body = GeminiRequest::with_image(
            ANALYST_PROMPT,
            GeminiInlineData::new(IMAGE_MIME_TYPE, image_base64),
        );

        let mut target_request = self
            .http_client
            .post(&target_url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json");

        if let Ok(val) = HeaderValue::from_str(&request_id.0) {
            target_request = target_request.header(REQUEST_ID_HEADER, val);
        }

        info!("Calling Gemini model {} at: {}", settings.model, target_url);
        // The URL carries the key, so transport errors must not keep it
        let response = target_request
            .json(&body)
            .send()
            .await
            .map_err(UpstreamError::redacted)?;
        let response = UpstreamError::check_api_status(response).await?;
        let raw = response.bytes().await.map_err(UpstreamError::redacted)?;
        Ok(extract_analysis(&raw))
    }
}

/// Generated text from a successful `generateContent` body, or [`NO_ANALYSIS`]
/// when the body has no usable text.
pub fn extract_analysis(raw: &[u8]) -> String {
    let response: GeminiResponse = match serde_json::from_slice(raw) {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Failed to parse Gemini response: {}", e);
            return NO_ANALYSIS.to_string();
        }
    };

    if let Some(usage) = &response.usage_metadata {
        debug!(
            "Gemini usage: prompt={:?} candidates={:?} total={:?}",
            usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
        );
    }

    match response.first_text() {
        Some(text) => text.to_string(),
        None => {
            warn!(
                "Gemini returned no text (finish reason: {:?})",
                response.first_finish_reason()
            );
            NO_ANALYSIS.to_string()
        }
    }
}
