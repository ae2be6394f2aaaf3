//! Text-to-text inference endpoint client.
//!
//! Request: `{"inputs": "<prompt>", "parameters": {...}}`.
//! Response: `[{"generated_text": "..."}]`; a bare object is accepted too.

use crate::{Summarizer, SummarizerError, SummaryRequest};
use async_trait::async_trait;
use serde_json::Value;

pub struct HttpSummarizer {
    pub endpoint: String,
    pub model: String,
    client: reqwest::Client,
}

impl HttpSummarizer {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn build_body(&self, request: &SummaryRequest) -> Value {
        serde_json::json!({
            "inputs": request.prompt(),
            "parameters": request.task.parameters(),
        })
    }

    pub fn parse_generation(&self, json: &Value) -> Result<String, SummarizerError> {
        let generation = match json {
            Value::Array(items) => items
                .first()
                .ok_or_else(|| SummarizerError::Parse("empty generation list".to_string()))?,
            other => other,
        };

        if let Some(error) = generation.get("error").and_then(Value::as_str) {
            return Err(SummarizerError::Parse(error.to_string()));
        }

        let text = generation
            .get("generated_text")
            .and_then(Value::as_str)
            .ok_or_else(|| SummarizerError::Parse("missing 'generated_text' field".to_string()))?
            .trim();

        if text.is_empty() {
            return Err(SummarizerError::EmptyOutput);
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        tracing::debug!(
            "requesting {:?} from '{}' ({} chars)",
            request.task,
            self.model,
            request.text.len()
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| SummarizerError::Unavailable(format!("{}: {}", self.model, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = resp.json().await?;
        self.parse_generation(&json)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
