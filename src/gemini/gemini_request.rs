use crate::gemini::{GeminiContent, GeminiInlineData, GeminiPart};
use serde::{Deserialize, Serialize};

/// Body of a `models/{model}:generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// One user turn: the instruction text followed by the image.
    pub fn with_image(prompt: &str, image: GeminiInlineData) -> Self {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![
                    GeminiPart::text(prompt),
                    GeminiPart::InlineData { inline_data: image },
                ],
            }],
        }
    }
}
