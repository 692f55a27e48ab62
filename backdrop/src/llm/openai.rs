//! OpenAI Chat Completions client implementing [`CompletionService`] (ChatOpenAI).
//!
//! Requires `OPENAI_API_KEY` (or explicit config). `OPENAI_BASE_URL` / `OPENAI_API_BASE`
//! redirect requests to a compatible endpoint. Schema-constrained calls are sent with
//! `response_format = json_schema` and the returned content is parsed as JSON.

use async_trait::async_trait;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};

use super::{Completion, CompletionService, LlmError, OutputSchema};

/// OpenAI Chat Completions client.
///
/// Uses `OPENAI_API_KEY` from the environment by default; or provide config via
/// [`ChatOpenAI::with_config`].
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(Self::env_config(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Default config, honoring `OPENAI_BASE_URL` / `OPENAI_API_BASE` when set.
    fn env_config() -> OpenAIConfig {
        let config = OpenAIConfig::new();
        match Self::env_base_url() {
            Some(base) => config.with_api_base(base),
            None => config,
        }
    }

    fn env_base_url() -> Option<String> {
        std::env::var("OPENAI_BASE_URL")
            .or_else(|_| std::env::var("OPENAI_API_BASE"))
            .ok()
            .filter(|s| !s.trim().is_empty())
    }

    /// Chat completions URL used for logging. Does not append /v1 when base already ends with /v1.
    fn chat_completions_url() -> String {
        let base = Self::env_base_url().unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let base = base.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn response_format(schema: &OutputSchema) -> ResponseFormat {
        ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: schema.description.clone(),
                name: schema.name.clone(),
                schema: Some(schema.schema.clone()),
                strict: Some(schema.strict),
            },
        }
    }
}

/// Parses the content of a schema-constrained answer. Code fences some
/// compatible endpoints wrap around JSON are stripped first.
pub(crate) fn parse_structured(schema_name: &str, content: &str) -> Result<serde_json::Value, LlmError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(body)
        .map_err(|e| LlmError::Schema(format!("{}: invalid JSON: {}", schema_name, e)))
}

#[async_trait]
impl CompletionService for ChatOpenAI {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Option<&OutputSchema>,
    ) -> Result<Completion, LlmError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                system_prompt,
            )),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(user_prompt)),
        ];
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(messages);
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        if let Some(s) = schema {
            args.response_format(Self::response_format(s));
        }
        let request = args
            .build()
            .map_err(|e| LlmError::Request(format!("OpenAI request build failed: {}", e)))?;

        let url = Self::chat_completions_url();
        debug!(
            trace_id = %trace_id,
            url = %url,
            model = %self.model,
            temperature = ?self.temperature,
            schema = schema.map(|s| s.name.as_str()).unwrap_or("-"),
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, url = %url, request = %js, "OpenAI request body");
        }

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(format!("OpenAI API error: {}", e)))?;

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, url = %url, response = %js, "OpenAI response body");
        }
        if let Some(ref u) = response.usage {
            debug!(
                trace_id = %trace_id,
                prompt_tokens = u.prompt_tokens,
                completion_tokens = u.completion_tokens,
                total_tokens = u.total_tokens,
                "OpenAI usage"
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::NoChoices)?;
        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)?;

        match schema {
            Some(s) => parse_structured(&s.name, &content).map(Completion::Structured),
            None => Ok(Completion::Text(content)),
        }
    }
}
