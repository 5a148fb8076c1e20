//! Backend for the BigModel (Zhipu AI) open platform.
//!
//! Endpoint: `{base_url}/chat/completions` — the platform exposes an
//! OpenAI-compatible chat API under `/api/paas/v4`. Authentication is a
//! bearer token in the `Authorization` header.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Backend, CompletionRequest, CompletionResponse};
use crate::error::{ChainError, Result};

/// Backend for the BigModel chat-completions API.
///
/// # Example
///
/// ```
/// use prompt_chain::backend::BigModelBackend;
///
/// let backend = BigModelBackend::new("sk-...");
/// ```
#[derive(Clone)]
pub struct BigModelBackend {
    api_key: String,
}

impl std::fmt::Debug for BigModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BigModelBackend")
            .field(
                "api_key",
                &if self.api_key.len() > 6 {
                    format!("{}***", &self.api_key[..6])
                } else {
                    "***".to_string()
                },
            )
            .finish()
    }
}

impl BigModelBackend {
    /// Create a backend authenticating with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Build the messages array from the rendered turns.
    fn build_messages(request: &CompletionRequest) -> Vec<Value> {
        request
            .prompt
            .turns
            .iter()
            .map(|turn| json!({"role": turn.role.as_str(), "content": turn.text}))
            .collect()
    }

    /// Build the request body for `/chat/completions`.
    fn build_body(request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": request.model,
            "messages": Self::build_messages(request),
            "temperature": request.sampling.temperature,
            "max_tokens": request.sampling.max_tokens,
            "stream": false,
        });

        if let Some(top_p) = request.sampling.top_p {
            body["top_p"] = json!(top_p);
        }

        body
    }

    /// Extract metadata from a provider response.
    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        if let Some(v) = json_resp.get("usage") {
            meta.insert("usage".into(), v.clone());
        }
        if let Some(v) = json_resp.get("model") {
            meta.insert("model".into(), v.clone());
        }
        if let Some(v) = json_resp.get("id") {
            meta.insert("id".into(), v.clone());
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

#[async_trait]
impl Backend for BigModelBackend {
    async fn complete(
        &self,
        client: &Client,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let body = Self::build_body(request);

        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ChainError::Completion { status, body: text });
        }

        let json_resp: Value = resp.json().await?;

        let text = json_resp
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(CompletionResponse {
            text,
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "bigmodel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplingConfig;
    use crate::template::{RenderedPrompt, Role, Turn};

    fn test_request(sampling: SamplingConfig) -> CompletionRequest {
        CompletionRequest {
            model: "GLM-4-FlashX-250414".into(),
            prompt: RenderedPrompt {
                turns: vec![
                    Turn::new(Role::System, "你是一位规划师。"),
                    Turn::new(Role::User, "做一个登录页"),
                ],
            },
            sampling,
        }
    }

    #[test]
    fn build_body_basic() {
        let body = BigModelBackend::build_body(&test_request(SamplingConfig::planning()));

        assert_eq!(body["model"], "GLM-4-FlashX-250414");
        assert_eq!(body["temperature"], 0.7);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["stream"], false);
        // top_p only appears when explicitly set
        assert!(body.get("top_p").is_none());

        let messages = body["messages"].as_array().expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "你是一位规划师。");
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn build_body_with_top_p() {
        let body = BigModelBackend::build_body(&test_request(SamplingConfig::diary()));
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["top_p"], 0.9);
    }

    #[test]
    fn build_messages_preserves_turn_order() {
        let request = CompletionRequest {
            model: "m".into(),
            prompt: RenderedPrompt {
                turns: vec![
                    Turn::new(Role::System, "s"),
                    Turn::new(Role::User, "example in"),
                    Turn::new(Role::Assistant, "example out"),
                    Turn::new(Role::User, "real input"),
                ],
            },
            sampling: SamplingConfig::default(),
        };
        let messages = BigModelBackend::build_messages(&request);
        let roles: Vec<&str> = messages
            .iter()
            .map(|m| m["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn debug_redacts_api_key() {
        let backend = BigModelBackend::new("sk-1234567890abcdef");
        let output = format!("{backend:?}");
        assert!(!output.contains("1234567890abcdef"));
        assert!(output.contains("sk-123"));
        assert!(output.contains("***"));
    }

    #[test]
    fn extract_metadata_collects_known_fields() {
        let resp = json!({
            "id": "chatcmpl-1",
            "model": "GLM-4-FlashX-250414",
            "usage": {"total_tokens": 42},
            "choices": []
        });
        let meta = BigModelBackend::extract_metadata(&resp).expect("metadata");
        assert_eq!(meta["usage"]["total_tokens"], 42);
        assert_eq!(meta["id"], "chatcmpl-1");
    }

    #[test]
    fn extract_metadata_empty_is_none() {
        assert!(BigModelBackend::extract_metadata(&json!({"choices": []})).is_none());
    }
}
