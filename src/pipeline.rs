//! The three concrete prompt-chain pipelines.
//!
//! Each pipeline is the same shape — render → complete → parse → [correct] —
//! differing only in template, schema, sampling, and whether the corrector
//! stage runs. A stage failure is terminal for the request: no stage retries
//! another, and no partial output is returned.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::client::CompletionClient;
use crate::config::SamplingConfig;
use crate::error::Result;
use crate::lexicon;
use crate::parser;
use crate::prompts;
use crate::schema::{DiaryAnalysis, TaskList, TaskReview};
use crate::template::PromptSpec;

/// Splits a natural-language feature request into ordered development tasks.
///
/// Output schema: a bare JSON array of ≥1 non-empty strings. No corrector.
pub struct TaskPlanner {
    client: Arc<CompletionClient>,
    prompt: PromptSpec,
    sampling: SamplingConfig,
}

impl TaskPlanner {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            client,
            prompt: prompts::task_planning(),
            sampling: SamplingConfig::planning(),
        }
    }

    /// Run the pipeline for one user request.
    pub async fn plan(&self, request: &str) -> Result<TaskList> {
        let vars = HashMap::from([("prompt".to_string(), request.to_string())]);
        let rendered = self.prompt.render(&vars)?;

        let raw = self.client.complete(&rendered, &self.sampling).await?;
        let list = parser::parse_task_list(&raw)?;

        info!(tasks = list.tasks.len(), "task planning complete");
        Ok(list)
    }
}

/// Classifies mood, extracts keywords, and generates suggestions from a
/// short diary entry.
///
/// Output schema: `{mood, emoji, keywords, suggestions}`. The lexical mood
/// corrector runs after parsing.
pub struct DiaryAnalyzer {
    client: Arc<CompletionClient>,
    prompt: PromptSpec,
    sampling: SamplingConfig,
}

impl DiaryAnalyzer {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            client,
            prompt: prompts::diary_analysis(),
            sampling: SamplingConfig::diary(),
        }
    }

    /// Run the pipeline for one diary entry.
    pub async fn analyze(&self, diary: &str) -> Result<DiaryAnalysis> {
        let signal = lexicon::scan(diary);
        debug!(
            positive = signal.positive,
            negative = signal.negative,
            "lexicon scan"
        );

        let vars = HashMap::from([
            ("diary".to_string(), diary.to_string()),
            ("pos_cnt".to_string(), signal.positive.to_string()),
            ("neg_cnt".to_string(), signal.negative.to_string()),
        ]);
        let rendered = self.prompt.render(&vars)?;

        let raw = self.client.complete(&rendered, &self.sampling).await?;
        let parsed = parser::parse_diary_analysis(&raw)?;

        let result = lexicon::correct(parsed, signal);
        info!(mood = result.mood.as_str(), "diary analysis complete");
        Ok(result)
    }
}

/// Validates a task list against missing items.
///
/// Same orchestration shape as the other two pipelines; not wired to any
/// HTTP route.
pub struct TaskReviewer {
    client: Arc<CompletionClient>,
    prompt: PromptSpec,
    sampling: SamplingConfig,
}

impl TaskReviewer {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            client,
            prompt: prompts::task_review(),
            sampling: SamplingConfig::default(),
        }
    }

    /// Review a previously planned task list.
    pub async fn review(&self, tasks: &[String]) -> Result<TaskReview> {
        // The list is interpolated as a JSON array so the model sees exact
        // task boundaries.
        let listing = serde_json::to_string(tasks).unwrap_or_default();
        let vars = HashMap::from([("tasks".to_string(), listing)]);
        let rendered = self.prompt.render(&vars)?;

        let raw = self.client.complete(&rendered, &self.sampling).await?;
        let review = parser::parse_task_review(&raw)?;

        info!(
            valid = review.valid,
            missing = review.missing_tasks.len(),
            "task review complete"
        );
        Ok(review)
    }
}
