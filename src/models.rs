use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Inbound body: `{ "data": { "imageUrl": "..." } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeImageRequest {
    #[serde(default)]
    pub data: Option<DescribeImageData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescribeImageData {
    #[serde(rename = "imageUrl")]
    #[serde(default)]
    pub image_url: Option<String>,
}

impl DescribeImageRequest {
    /// Parses a raw request body and returns the image URL it names.
    ///
    /// Anything other than a JSON object with a non-empty string at
    /// `data.imageUrl` counts as a missing argument.
    pub fn image_url_from_body(body: &[u8]) -> Result<String, AnalysisError> {
        serde_json::from_slice::<DescribeImageRequest>(body)
            .ok()
            .and_then(|request| request.data)
            .and_then(|data| data.image_url)
            .filter(|url| !url.is_empty())
            .ok_or(AnalysisError::InvalidArgument)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub data: AnalysisData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisData {
    pub analysis: String,
}

impl AnalysisResponse {
    pub fn new(analysis: String) -> Self {
        Self {
            data: AnalysisData { analysis },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_from_body() {
        let url = DescribeImageRequest::image_url_from_body(
            br#"{"data":{"imageUrl":"https://example.com/front.jpg"}}"#,
        )
        .unwrap();
        assert_eq!(url, "https://example.com/front.jpg");
    }

    #[test]
    fn test_image_url_missing_variants() {
        let bodies: [&[u8]; 8] = [
            b"",
            b"not json",
            b"[]",
            br#"{}"#,
            br#"{"data":null}"#,
            br#"{"data":{}}"#,
            br#"{"data":{"imageUrl":null}}"#,
            br#"{"data":{"imageUrl":""}}"#,
        ];
        for body in bodies {
            let err = DescribeImageRequest::image_url_from_body(body).unwrap_err();
            assert!(
                matches!(err, AnalysisError::InvalidArgument),
                "body {:?} should be rejected",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_image_url_wrong_type_is_missing() {
        let err = DescribeImageRequest::image_url_from_body(br#"{"data":{"imageUrl":42}}"#).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidArgument));
    }

    #[test]
    fn test_envelopes_serialize() {
        let ok = serde_json::to_value(AnalysisResponse::new("text".to_string())).unwrap();
        assert_eq!(ok, serde_json::json!({ "data": { "analysis": "text" } }));

        let err = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(err, serde_json::json!({ "error": { "message": "boom" } }));
    }
}
