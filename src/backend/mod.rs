//! Backend trait and normalized request/response types.
//!
//! The [`Backend`] trait abstracts over completion providers, translating
//! between normalized [`CompletionRequest`]/[`CompletionResponse`] types and
//! the provider's HTTP API. Built-in implementations: [`BigModelBackend`]
//! (the production provider) and [`MockBackend`] (tests).
//!
//! There is deliberately no retry or backoff here: a provider failure is a
//! single terminal error surfaced to the orchestrator for that request.

pub mod bigmodel;
pub mod mock;

pub use bigmodel::BigModelBackend;
pub use mock::MockBackend;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::SamplingConfig;
use crate::error::Result;
use crate::template::RenderedPrompt;

/// A normalized completion request — provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (e.g. `"GLM-4-FlashX-250414"`).
    pub model: String,

    /// The rendered chat turns to send.
    pub prompt: RenderedPrompt,

    /// Sampling options (temperature, max_tokens, top_p).
    pub sampling: SamplingConfig,
}

/// A normalized completion response.
#[derive(Debug)]
pub struct CompletionResponse {
    /// The generated text content.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token counts, model info).
    /// Stored as raw JSON — each provider returns different fields.
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over completion providers.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute a non-streaming completion call.
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}
