//! Type definitions for the Gemini API
//!
//! Wire types for `generateContent`. The REST API speaks camelCase JSON.

use serde::{Deserialize, Serialize};

/// Content represents one turn of a conversation with the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    /// The role of the content (e.g., "user", "model")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The parts that make up this content
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Default for Content {
    fn default() -> Self {
        Self::new()
    }
}

impl Content {
    /// Create a new empty content
    pub fn new() -> Self {
        Self {
            role: None,
            parts: Vec::new(),
        }
    }

    /// Set the role for this content
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Add text to this content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part {
            text: Some(text.into()),
        });
        self
    }
}

/// A part of content. Only text parts are produced or consumed here;
/// other part kinds in a response deserialize with `text: None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Generation configuration for content generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Temperature controls randomness in generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-k controls diversity by limiting to k most likely tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i32>,

    /// Top-p controls diversity by limiting to tokens with cumulative probability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<i32>,
}

/// Response from content generation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// The generated candidates; absent when the prompt was blocked
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Prompt feedback
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// A candidate response from the model
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The content of the candidate
    #[serde(default)]
    pub content: Option<Content>,

    /// Finish reason
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Feedback on the prompt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Why the prompt was blocked, if it was
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// HTTP options for client configuration
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Base URL of the API
    pub base_url: String,

    /// API version
    pub api_version: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_version: "v1beta".to_string(),
            timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            top_k: Some(40),
            top_p: None,
            max_output_tokens: Some(1024),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temperature": 0.5, "topK": 40, "maxOutputTokens": 1024})
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"role": "model", "parts": [
                {"text": "[\"a\","}, {"thought": true}, {"text": " \"b\"]"}
            ]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), r#"["a", "b"]"#);
        assert_eq!(response.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert_eq!(response.text(), "");
        assert_eq!(
            response.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }
}
