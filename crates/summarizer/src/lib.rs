//! # HCA Summarizer
//!
//! Client side of the note summarisation model.
//!
//! The web layer only sees the [`Summarizer`] trait. [`HttpSummarizer`] talks to a
//! text-to-text inference endpoint; tests substitute their own implementations.

mod http;

pub use http::HttpSummarizer;

use async_trait::async_trait;
use serde::Serialize;

/// Errors from summarisation calls.
#[derive(Debug, thiserror::Error)]
pub enum SummarizerError {
    #[error("model '{0}' unavailable")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("model returned an empty output")]
    EmptyOutput,
}

impl From<reqwest::Error> for SummarizerError {
    fn from(e: reqwest::Error) -> Self {
        SummarizerError::Http(e.to_string())
    }
}

/// What the generated text is for. Selects the generation length bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteTask {
    /// Plain-language explanation of a clinical note.
    Explain,
    /// Short summary of a clinical note.
    Summarize,
}

impl NoteTask {
    pub fn max_length(self) -> u32 {
        match self {
            NoteTask::Explain => 150,
            NoteTask::Summarize => 100,
        }
    }

    pub fn min_length(self) -> u32 {
        match self {
            NoteTask::Explain => 30,
            NoteTask::Summarize => 20,
        }
    }

    pub fn parameters(self) -> GenerationParameters {
        GenerationParameters {
            max_length: self.max_length(),
            min_length: self.min_length(),
            do_sample: false,
        }
    }
}

/// Generation settings sent alongside the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationParameters {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

/// One note to run through the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRequest {
    pub task: NoteTask,
    pub text: String,
}

impl SummaryRequest {
    pub const PROMPT_PREFIX: &'static str = "summarize: ";

    pub fn new(task: NoteTask, text: impl Into<String>) -> Self {
        Self {
            task,
            text: text.into(),
        }
    }

    /// Model input: the note behind the task prefix.
    pub fn prompt(&self) -> String {
        format!("{}{}", Self::PROMPT_PREFIX, self.text)
    }
}

/// A model that turns a clinical note into shorter text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate text for `request`.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizerError>;
    /// Human-readable model name (e.g. "t5-small").
    fn name(&self) -> &str;
}
