use thiserror::Error;

use crate::parser::ParseError;

/// Errors produced by the prompt-chain pipelines and their components.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Invalid or missing configuration detected at startup (e.g. no API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// A template placeholder had no matching variable. Caller programming
    /// error, never retried.
    #[error("template placeholder '{{{placeholder}}}' has no supplied value")]
    TemplateRender { placeholder: String },

    /// Low-level HTTP transport failure (connection refused, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The completion backend returned a non-success status code.
    #[error("completion backend returned HTTP {status}: {body}")]
    Completion {
        /// HTTP status code (e.g. 401, 429, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Model output violated the declared schema. Field-level validation
    /// failures are folded into this category.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, ChainError>;
