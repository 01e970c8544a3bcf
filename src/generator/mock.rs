//! # Mock Text Generator for Testing
//!
//! Provides a `MockGenerator` that implements the `TextGenerator` trait for
//! use in tests. Replies are configured per topic; every request is recorded
//! so tests can inspect the prompts that were built.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{GenerationRequest, TextGenerator, Topic};
use crate::error::{Error, Result};

/// A mock generator returning canned replies per topic.
/// Topics without a configured reply get an empty string.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    replies: HashMap<Topic, std::result::Result<String, String>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `text` for `topic`
    pub fn with_reply(mut self, topic: Topic, text: impl Into<String>) -> Self {
        self.replies.insert(topic, Ok(text.into()));
        self
    }

    /// Fail every request for `topic`
    pub fn with_failure(mut self, topic: Topic, message: impl Into<String>) -> Self {
        self.replies.insert(topic, Err(message.into()));
        self
    }

    /// Fail every request regardless of topic
    pub fn failing(message: &str) -> Self {
        Topic::ALL
            .into_iter()
            .fold(Self::new(), |mock, topic| mock.with_failure(topic, message))
    }

    /// Requests received so far, in arrival order
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }
}

impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests.lock().await.push(request.clone());
        match self.replies.get(&request.topic) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(message)) => Err(Error::Other(message.clone())),
            None => Ok(String::new()),
        }
    }
}
