use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, VisionProvider, VisionRequest};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent` provider
#[derive(Debug)]
pub struct GeminiProvider<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> GeminiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_GEMINI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    fn build_request(&self, request: &VisionRequest) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": request.prompt })];

        for image in &request.images {
            parts.push(serde_json::json!({
                "inline_data": {
                    "mime_type": image.media_type,
                    "data": image.base64_data(),
                }
            }));
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": parts,
            }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
            },
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: GeminiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("gemini", format!("Failed to parse response: {}", e))
        })?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(DomainError::provider("gemini", "Empty response"));
        }

        Ok(text)
    }
}

#[async_trait]
impl<C: HttpClientTrait> VisionProvider for GeminiProvider<C> {
    async fn generate(&self, model: &str, request: VisionRequest) -> Result<String, DomainError> {
        let url = self.generate_url(model);
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// Gemini API types

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InlineImage;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str =
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

    fn mock_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }],
                },
                "finishReason": "STOP",
            }],
        })
    }

    #[tokio::test]
    async fn test_generate() {
        let client = MockHttpClient::new().with_response(TEST_URL, mock_response("{\"ok\":true}"));
        let provider = GeminiProvider::new(client, "test-api-key");

        let request = VisionRequest::new("Classify this product")
            .with_image(InlineImage::new(vec![1, 2, 3], "image/jpeg"));
        let text = provider.generate("gemini-1.5-flash", request).await.unwrap();

        assert_eq!(text, "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let client =
            MockHttpClient::new().with_response(TEST_URL, serde_json::json!({ "candidates": [] }));
        let provider = GeminiProvider::new(client, "test-api-key");

        let result = provider
            .generate("gemini-1.5-flash", VisionRequest::new("hello"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom = "http://localhost:8081/v1beta/models/gemini-1.5-flash:generateContent";
        let client = MockHttpClient::new().with_response(custom, mock_response("[]"));
        let provider = GeminiProvider::with_base_url(client, "key", "http://localhost:8081");

        let text = provider
            .generate("gemini-1.5-flash", VisionRequest::new("hello"))
            .await
            .unwrap();
        assert_eq!(text, "[]");
    }

    #[test]
    fn test_build_request_includes_images() {
        let provider = GeminiProvider::new(MockHttpClient::new(), "key");
        let request = VisionRequest::new("prompt")
            .with_image(InlineImage::new(vec![0xFF], "image/png"));

        let body = provider.build_request(&request);
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "prompt");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
    }
}
