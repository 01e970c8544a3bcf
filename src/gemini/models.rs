//! Models service for the Gemini API

use crate::error::Result;
use crate::gemini::http::HttpClient;
use crate::gemini::types::{Content, GenerateContentResponse, GenerationConfig};
use serde::Serialize;
use tracing::{debug, instrument};

/// Request for generating content
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    /// The contents to generate from
    contents: Vec<Content>,

    /// Generation configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Service for interacting with Gemini models
#[derive(Debug, Clone)]
pub struct ModelsService {
    /// HTTP client for making API requests
    http_client: HttpClient,
}

impl ModelsService {
    /// Create a new models service
    pub(crate) fn new(http_client: HttpClient) -> Self {
        Self { http_client }
    }

    /// Generate content with configuration
    #[instrument(skip(self, contents, config), level = "debug")]
    pub async fn generate_content_with_config(
        &self,
        model: impl Into<String> + std::fmt::Debug,
        contents: Vec<Content>,
        config: Option<GenerationConfig>,
    ) -> Result<GenerateContentResponse> {
        let model = model.into();

        let request = GenerateContentRequest {
            contents,
            generation_config: config,
        };

        let path = format!("models/{}:generateContent", model);

        debug!("Generating content from model {}", model);
        self.http_client.post(&path, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::types::HttpOptions;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_generate_content() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Hallo"}]}],
                "generationConfig": {"temperature": 0.2, "maxOutputTokens": 64}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                "candidates": [{
                    "content": {
                        "parts": [{
                            "text": "Generated text"
                        }]
                    }
                }]
            }"#,
            )
            .create_async()
            .await;

        let options = HttpOptions {
            base_url: server.url(),
            ..HttpOptions::default()
        };
        let http_client =
            HttpClient::with_api_key_and_options("test-key".to_string(), options).unwrap();
        let models_service = ModelsService::new(http_client);

        let content = Content::new().with_role("user").with_text("Hallo");
        let config = GenerationConfig {
            temperature: Some(0.2),
            max_output_tokens: Some(64),
            ..GenerationConfig::default()
        };
        let response = models_service
            .generate_content_with_config("gemini-2.5-flash", vec![content], Some(config))
            .await
            .unwrap();

        assert_eq!(response.text(), "Generated text");
        mock_server.assert_async().await;
    }
}
