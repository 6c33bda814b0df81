use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// Anthropic completions via rig. Reads `ANTHROPIC_API_KEY` from the
/// environment at call time. One blocking call per turn; no retries.
pub struct AnthropicLlm {
    model: String,
    max_new_tokens: usize,
}

impl AnthropicLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_new_tokens: config.max_new_tokens,
        }
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        let client = anthropic::Client::from_env();
        let agent = client
            .agent(&self.model)
            .preamble(system)
            .max_tokens(self.max_new_tokens as u64)
            .build();
        agent
            .prompt(prompt)
            .await
            .map_err(|e| DomainError::external(e.to_string()))
    }
}
