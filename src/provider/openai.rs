// src/provider/openai.rs — OpenAI Chat Completions provider

use async_trait::async_trait;

use super::{Completion, CompletionProvider, CompletionRequest, TokenUsage, EMPTY_REPLY_PLACEHOLDER};
use crate::infra::errors::TownhallError;

pub const DEFAULT_MODEL: &str = "gpt-4.1";

pub struct OpenAiProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, TownhallError> {
        let body = serde_json::json!({
            "model": request.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user_message },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TownhallError::Provider {
                provider: "openai".into(),
                message: e.to_string(),
                retriable: e.is_timeout() || e.is_connect(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TownhallError::InvalidCredential(
                "OpenAI rejected the API key".into(),
            ));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TownhallError::RateLimited {
                provider: "openai".into(),
                retry_after_ms: 5000,
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TownhallError::Provider {
                provider: "openai".into(),
                message: format!("HTTP {}: {}", status, crate::util::ellipsize(&text, 200)),
                retriable: status.is_server_error(),
            });
        }

        let json: serde_json::Value =
            response.json().await.map_err(|e| TownhallError::Provider {
                provider: "openai".into(),
                message: format!("invalid response body: {}", e),
                retriable: false,
            })?;

        // An empty or malformed choice is a placeholder reply, not an error.
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(EMPTY_REPLY_PLACEHOLDER)
            .to_string();

        let usage = TokenUsage {
            input_tokens: json["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: json["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(Completion { content, usage })
    }
}
