use std::time::Duration;

use async_trait::async_trait;
use critic_core::{CriticError, LlmConfig, ReviewOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pipeline::ReviewBackend;
use crate::prompt;

/// A message in a chat conversation with the LLM.
///
/// # Examples
///
/// ```
/// use critic_review::llm::{ChatMessage, Role};
///
/// let msg = ChatMessage {
///     role: Role::User,
///     content: "Review this code".into(),
/// };
/// assert!(matches!(msg.role, Role::User));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: Role,
    /// Text content of the message.
    pub content: String,
}

/// Role in the chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions.
    System,
    /// User input.
    User,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
///
/// Works with any provider that exposes the `/v1/chat/completions` endpoint.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
/// use critic_review::llm::LlmClient;
///
/// let config = LlmConfig {
///     api_key: Some("test-key".into()),
///     ..LlmConfig::default()
/// };
/// let client = LlmClient::new(&config).unwrap();
/// assert_eq!(client.model(), "gpt-4-turbo-preview");
/// ```
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Llm`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, CriticError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CriticError::Llm(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Return the model name from the configuration.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com")
            .trim_end_matches('/');
        format!("{base_url}/v1/chat/completions")
    }

    /// Send a chat completion request and return the first choice's text.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Llm`] on HTTP errors or response parsing failures.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, CriticError> {
        let url = self.endpoint();
        let body = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        debug!(%url, model = %self.config.model, "sending chat completion");

        let mut request = self.client.post(&url);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .json(&body)
            .send()
            .await
            .map_err(|e| CriticError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CriticError::Llm(format!(
                "LLM API error {status}: {body_text}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CriticError::Llm(format!("failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CriticError::Llm("response contained no completion text".into()))
    }
}

#[async_trait]
impl ReviewBackend for LlmClient {
    fn model(&self) -> &str {
        LlmClient::model(self)
    }

    async fn request_review(&self, prompt: &str) -> ReviewOutcome {
        let messages = [
            ChatMessage {
                role: Role::System,
                content: prompt::build_system_prompt(),
            },
            ChatMessage {
                role: Role::User,
                content: prompt.to_string(),
            },
        ];
        match self.chat(&messages).await {
            Ok(text) => ReviewOutcome::Completed(text),
            Err(e) => {
                debug!(error = %e, "review request failed");
                ReviewOutcome::Failed(e.to_string())
            }
        }
    }
}
