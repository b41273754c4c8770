use crate::error::UpstreamError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as Base64;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct ImageClient {
    http_client: Arc<reqwest::Client>,
}

impl ImageClient {
    pub fn new(http_client: Arc<reqwest::Client>) -> Self {
        Self { http_client }
    }

    /// Downloads the image at `image_url` into memory.
    pub async fn fetch(&self, image_url: &str) -> Result<Bytes, UpstreamError> {
        info!("Fetching image from: {}", image_url);
        let response = self.http_client.get(image_url).send().await?;
        let response = UpstreamError::check_status(response)?;
        let bytes = response.bytes().await?;
        debug!("Fetched {} bytes", bytes.len());
        Ok(bytes)
    }
}

pub fn encode_image(bytes: &[u8]) -> String {
    Base64.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ImageClient {
        ImageClient::new(Arc::new(reqwest::Client::new()))
    }

    #[test]
    fn test_encode_is_lossless() {
        let bytes: Vec<u8> = (0..=255u8).chain([0xff, 0xd8, 0xff, 0xe0, 0x00]).collect();
        let encoded = encode_image(&bytes);
        assert_eq!(Base64.decode(encoded).unwrap(), bytes);
        assert_eq!(encode_image(b""), "");
    }

    #[tokio::test]
    async fn test_fetch_returns_raw_bytes() {
        let image = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/front.jpg")
            .with_status(200)
            .with_header("content-type", "image/jpeg")
            .with_body(image.clone())
            .create_async()
            .await;

        let bytes = client().fetch(&format!("{}/front.jpg", server.url())).await.unwrap();
        assert_eq!(bytes.as_ref(), image.as_slice());
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let err = client()
            .fetch(&format!("{}/missing.jpg", server.url()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 404");
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let err = client().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
