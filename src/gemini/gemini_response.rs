use crate::gemini::{GeminiCandidate, GeminiFinishReason, GeminiUsage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<GeminiUsage>,
    #[serde(rename = "modelVersion")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate, when that part is non-empty text.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .as_text()
            .filter(|text| !text.is_empty())
    }

    pub fn first_finish_reason(&self) -> Option<&GeminiFinishReason> {
        self.candidates.first()?.finish_reason.as_ref()
    }
}
