// src/provider/mod.rs — Completion gateway layer
//
// The external collaborator boundary. A provider marshals one persona
// system prompt plus one user question into a completion request and
// returns the reply text; it owns no conversation logic.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::TownhallError;

/// Substituted when a provider answers successfully but with an empty or
/// malformed body; treated as a normal reply, not an error.
pub const EMPTY_REPLY_PLACEHOLDER: &str =
    "I apologize, I encountered an issue generating a response.";

/// Fixed sampling temperature used by every deployment.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, TownhallError>;
}

#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
