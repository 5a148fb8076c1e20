//! # Prompt Chain
//!
//! Two small HTTP services that turn free-text user input into structured
//! results via an LLM backend: a task-decomposition endpoint that splits a
//! natural-language feature request into ordered development tasks, and a
//! diary-sentiment endpoint that classifies mood, extracts keywords, and
//! generates suggestions.
//!
//! The interesting part is the prompt-chain pipeline each endpoint runs:
//!
//! ```text
//! input ──► PromptSpec::render ──► CompletionClient::complete ──► raw text
//!                                                                    │
//!                    final result ◄── lexicon::correct ◄── parser::parse_*
//! ```
//!
//! - **[`template`]** — parameterized prompts (system turn, verbatim few-shot
//!   examples, human template) with strict `{key}` substitution.
//! - **[`client`]** / **[`backend`]** — the completion client over an
//!   object-safe [`backend::Backend`] seam (BigModel in production, a mock in
//!   tests). Provider failure is a single terminal error per request.
//! - **[`parser`]** / **[`schema`]** — strict structured-output validation:
//!   the model text must be one complete JSON document matching the declared
//!   schema; no repair, no partial recovery.
//! - **[`lexicon`]** — deterministic post-parse mood correction from
//!   independent keyword counts.
//! - **[`pipeline`]** — the three concrete pipelines composing the above.
//! - **[`server`]** — the axum HTTP surface, including the streaming
//!   multipart upload endpoint.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use prompt_chain::client::CompletionClient;
//! use prompt_chain::pipeline::TaskPlanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads BIGMODEL_API_KEY from the environment; fails fast without it.
//!     let client = Arc::new(CompletionClient::from_env()?);
//!     let planner = TaskPlanner::new(client);
//!     let list = planner.plan("做一个带用户登录的博客系统").await?;
//!     for task in &list.tasks {
//!         println!("- {task}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod server;
pub mod template;

pub use client::CompletionClient;
pub use config::{CompletionConfig, SamplingConfig};
pub use error::{ChainError, Result};
pub use parser::ParseError;
pub use pipeline::{DiaryAnalyzer, TaskPlanner, TaskReviewer};
pub use schema::{DiaryAnalysis, Mood, TaskList, TaskReview};
pub use template::{PromptSpec, RenderedPrompt, Role};
