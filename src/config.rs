//! Completion-backend configuration and per-pipeline sampling presets.

use std::env;

use crate::error::{ChainError, Result};

/// Default chat model on the BigModel platform.
pub const DEFAULT_MODEL: &str = "GLM-4-FlashX-250414";
/// Default API base for the BigModel open platform.
pub const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Primary credential variable.
pub const API_KEY_VAR: &str = "BIGMODEL_API_KEY";
/// Secondary fallback credential variable (alternate provider key).
pub const FALLBACK_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Optional model-name override.
pub const MODEL_VAR: &str = "BIGMODEL_MODEL";
/// Optional endpoint override.
pub const BASE_URL_VAR: &str = "BIGMODEL_BASE_URL";

/// Read-only completion-client configuration, constructed once at process
/// start and threaded into each pipeline.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl CompletionConfig {
    /// Build a config with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load from the process environment.
    ///
    /// Fails with [`ChainError::Config`] when neither credential variable is
    /// set — the process must refuse to serve rather than start degraded.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_VAR)
            .or_else(|_| env::var(FALLBACK_API_KEY_VAR))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ChainError::Config(format!(
                    "missing {API_KEY_VAR} (or {FALLBACK_API_KEY_VAR}) in environment"
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Ok(model) = env::var(MODEL_VAR) {
            config.model = model;
        }
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field(
                "api_key",
                &if self.api_key.len() > 6 {
                    format!("{}***", &self.api_key[..6])
                } else {
                    "***".to_string()
                },
            )
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Sampling options for one completion request.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f64,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Nucleus sampling cutoff. `None` leaves the provider default.
    pub top_p: Option<f64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2048,
            top_p: None,
        }
    }
}

impl SamplingConfig {
    pub fn with_temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Planner preset: looser sampling for creative decomposition.
    pub fn planning() -> Self {
        Self::default().with_max_tokens(4096)
    }

    /// Diary preset: low temperature, high top-p for tight schema adherence.
    pub fn diary() -> Self {
        Self::default().with_temperature(0.2).with_top_p(0.9)
    }
}
