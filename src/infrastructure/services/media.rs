//! Media payload materialization

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

use crate::domain::CacheError;
use crate::domain::media::MediaPayload;

/// Turns a generator's media payload into storable bytes
///
/// A payload that cannot be materialized (undecodable base64, unreachable
/// URL) is reported as a generation error: the generator did not produce a
/// binary-capable result.
#[derive(Debug, Clone, Default)]
pub struct MediaMaterializer {
    http: reqwest::Client,
}

impl MediaMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-supplied HTTP client (connection pooling, proxies)
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn materialize(&self, payload: MediaPayload) -> Result<Bytes, CacheError> {
        match payload {
            MediaPayload::Bytes(bytes) => Ok(bytes),
            MediaPayload::Base64(encoded) => {
                // TTS providers return either bare base64 or a data URL.
                let encoded = match encoded.split_once(";base64,") {
                    Some((_, rest)) => rest,
                    None => encoded.as_str(),
                };

                BASE64
                    .decode(encoded.trim())
                    .map(Bytes::from)
                    .map_err(|e| {
                        CacheError::generation(format!(
                            "Generated content is not decodable base64: {}",
                            e
                        ))
                    })
            }
            MediaPayload::RemoteUrl(url) => {
                let response = self
                    .http
                    .get(&url)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| {
                        CacheError::generation(format!(
                            "Failed to fetch generated content from '{}': {}",
                            url, e
                        ))
                    })?;

                response.bytes().await.map_err(|e| {
                    CacheError::generation(format!(
                        "Failed to read generated content from '{}': {}",
                        url, e
                    ))
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_bytes_pass_through() {
        let materializer = MediaMaterializer::new();

        let bytes = materializer
            .materialize(MediaPayload::Bytes(Bytes::from_static(b"raw")))
            .await
            .unwrap();

        assert_eq!(bytes, Bytes::from_static(b"raw"));
    }

    #[tokio::test]
    async fn test_base64_is_decoded() {
        let materializer = MediaMaterializer::new();

        let bytes = materializer
            .materialize(MediaPayload::Base64("aGVsbG8=".to_string()))
            .await
            .unwrap();

        assert_eq!(bytes, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_data_url_is_decoded() {
        let materializer = MediaMaterializer::new();

        let bytes = materializer
            .materialize(MediaPayload::Base64(
                "data:audio/mpeg;base64,aGVsbG8=".to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(bytes, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_a_generation_error() {
        let materializer = MediaMaterializer::new();

        let result = materializer
            .materialize(MediaPayload::Base64("not base64!!!".to_string()))
            .await;

        assert!(matches!(result, Err(CacheError::Generation { .. })));
    }

    #[tokio::test]
    async fn test_remote_url_is_fetched() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/clip.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id3-payload".to_vec()))
            .mount(&server)
            .await;

        let materializer = MediaMaterializer::new();
        let bytes = materializer
            .materialize(MediaPayload::RemoteUrl(format!("{}/clip.mp3", server.uri())))
            .await
            .unwrap();

        assert_eq!(bytes, Bytes::from_static(b"id3-payload"));
    }

    #[tokio::test]
    async fn test_remote_error_status_propagates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let materializer = MediaMaterializer::new();
        let result = materializer
            .materialize(MediaPayload::RemoteUrl(format!(
                "{}/missing.mp3",
                server.uri()
            )))
            .await;

        assert!(matches!(result, Err(CacheError::Generation { .. })));
    }
}
