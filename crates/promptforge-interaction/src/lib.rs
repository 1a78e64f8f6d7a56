//! Generation collaborator for PromptForge.
//!
//! Defines the provider-agnostic [`GenerationAgent`] seam, the REST agents
//! that implement it, the request builder that renders prompts per
//! mode/round, and the response layer that turns raw provider text into
//! validated, typed results.

pub mod config;
pub mod defaults;
pub mod request;
pub mod response;

mod claude_api_agent;
mod openai_api_agent;

pub use claude_api_agent::ClaudeApiAgent;
pub use openai_api_agent::OpenAiApiAgent;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// The text pair sent to a provider.
///
/// The system instruction carries role and output-format rules; the user
/// payload carries the session-specific content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub system_instruction: String,
    pub user_payload: String,
}

impl Payload {
    pub fn new(
        system_instruction: impl Into<String>,
        user_payload: impl Into<String>,
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_payload: user_payload.into(),
        }
    }
}

/// Errors surfaced by a [`GenerationAgent`].
#[derive(Error, Debug, Clone)]
pub enum AgentError {
    /// The agent could not run at all (missing key, bad payload).
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The provider call itself failed (transport or HTTP error).
    #[error("Provider call failed: {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// Anything else (malformed provider envelope, etc.).
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Creates a ProcessError carrying the provider's retry-after hint.
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    /// Whether the same call might succeed if repeated by the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProcessError { is_retryable, .. } => *is_retryable,
            Self::ExecutionFailed(_) | Self::Other(_) => false,
        }
    }
}

/// An opaque remote generation function: text pair in, raw text out.
///
/// Latency and failure characteristics are the provider's business; the
/// engine treats every implementation identically and never retries on its
/// own.
#[async_trait]
pub trait GenerationAgent: Send + Sync {
    /// One-line description of what this agent is good at.
    fn expertise(&self) -> &str;

    /// Runs one generation call.
    async fn execute(&self, payload: Payload) -> Result<String, AgentError>;
}
