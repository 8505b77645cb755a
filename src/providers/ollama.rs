use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::core::llm::{LanguageModel, Message, Prompt};
use crate::providers::util::with_retry;

/// Chat completions against a local Ollama server.
pub struct OllamaClient {
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        OllamaClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize, Debug)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl LanguageModel for OllamaClient {
    #[instrument(name = "OllamaChat", skip_all)]
    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(model = %self.model, messages = prompt.messages.len(), "Sending chat request");
        let body = ChatRequest {
            model: &self.model,
            messages: &prompt.messages,
            stream: false,
        };

        let client = reqwest::Client::builder().user_agent("procplan/1.0").build()?;
        let response = with_retry(|| client.post(&url).json(&body).send(), 3, 500)
            .await
            .with_context(|| format!("Failed to reach language model at {url}"))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from language model {}",
                response.status(),
                self.model
            ));
        }

        let data = response
            .json::<ChatResponse>()
            .await
            .with_context(|| format!("Failed to parse reply from language model {}", self.model))?;

        debug!(reply = %data.message.content, "Language model replied");
        Ok(data.message.content)
    }
}
