//! The process-wide completion client.
//!
//! [`CompletionClient`] bundles the HTTP client, the provider backend, and the
//! read-only [`CompletionConfig`]. It is constructed once at startup (failing
//! fast when no credential is configured) and shared by `Arc` across every
//! pipeline — each request's completion call runs independently with no locks
//! held across the network suspension point.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::backend::{Backend, BigModelBackend, CompletionRequest};
use crate::config::{CompletionConfig, SamplingConfig};
use crate::error::Result;
use crate::template::RenderedPrompt;

/// Default per-request timeout for completion calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a text-completion backend.
pub struct CompletionClient {
    client: Client,
    backend: Arc<dyn Backend>,
    config: CompletionConfig,
}

impl CompletionClient {
    /// Create a client against the production BigModel backend.
    pub fn new(config: CompletionConfig) -> Self {
        let backend = Arc::new(BigModelBackend::new(config.api_key.clone()));
        Self::with_backend(config, backend)
    }

    /// Create a client with an explicit backend (tests use [`MockBackend`]).
    ///
    /// [`MockBackend`]: crate::backend::MockBackend
    pub fn with_backend(config: CompletionConfig, backend: Arc<dyn Backend>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            backend,
            config,
        }
    }

    /// Load configuration from the environment and build the client.
    ///
    /// Fails with a configuration error when no credential is present.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(CompletionConfig::from_env()?))
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a rendered prompt and return the raw response text.
    ///
    /// Any transport or provider failure is terminal for this request — no
    /// retry, no backoff.
    pub async fn complete(
        &self,
        prompt: &RenderedPrompt,
        sampling: &SamplingConfig,
    ) -> Result<String> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            prompt: prompt.clone(),
            sampling: sampling.clone(),
        };

        debug!(
            backend = self.backend.name(),
            model = %request.model,
            turns = request.prompt.turns.len(),
            "dispatching completion request"
        );

        let response = self
            .backend
            .complete(&self.client, &self.config.base_url, &request)
            .await?;

        debug!(
            status = response.status,
            chars = response.text.len(),
            "completion response received"
        );

        Ok(response.text)
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}
