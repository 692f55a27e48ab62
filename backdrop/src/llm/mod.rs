//! Completion service abstraction used by the pipeline stages.
//!
//! A stage sends a system prompt, a user prompt and optionally an [`OutputSchema`];
//! the service answers with free text or with a JSON value it claims matches the
//! schema. [`complete_structured`] validates that claim by deserializing into the
//! typed Rust struct, so callers get either a fully valid value or an error.
//!
//! Implementations: [`ChatOpenAI`] (OpenAI Chat Completions) and [`MockLlm`] (tests).

mod mock;
mod openai;

pub use mock::{CompletionCall, MockLlm};
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error from a completion call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request could not be built (e.g. invalid parameters).
    #[error("request build failed: {0}")]
    Request(String),

    /// Transport, auth or quota failure reported by the service.
    #[error("API error: {0}")]
    Api(String),

    /// The service answered without any choice.
    #[error("no choices returned")]
    NoChoices,

    /// The service answered with no content.
    #[error("empty content returned")]
    EmptyContent,

    /// Output is not valid JSON or does not match the requested schema.
    #[error("output does not match schema: {0}")]
    Schema(String),
}

/// Declared output shape for a schema-constrained completion.
///
/// `schema` is a JSON Schema object. With `strict`, every property must be listed in
/// `required` and `additionalProperties` must be `false`.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputSchema {
    /// Schema name sent to the service (e.g. `"search_queries"`).
    pub name: String,
    pub description: Option<String>,
    pub schema: serde_json::Value,
    pub strict: bool,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
            strict: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Result of a completion call.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    /// Free text (no schema requested).
    Text(String),
    /// JSON value returned for a schema-constrained call.
    Structured(serde_json::Value),
}

impl Completion {
    /// Text content; a structured value is rendered as compact JSON.
    pub fn into_text(self) -> String {
        match self {
            Completion::Text(s) => s,
            Completion::Structured(v) => v.to_string(),
        }
    }
}

/// A type the model can be asked to produce under a schema.
pub trait StructuredOutput: DeserializeOwned {
    /// Schema describing `Self`.
    fn output_schema() -> OutputSchema;
}

/// Completion service: prompts (+ optional schema) in, text or structured value out.
///
/// Errors are returned for transport/auth/quota failures and for malformed output;
/// a value returned for a schema call is never partially valid (see
/// [`complete_structured`]).
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Option<&OutputSchema>,
    ) -> Result<Completion, LlmError>;
}

/// Asks for a `T` under `T::output_schema()` and validates the answer into `T`.
///
/// Fails with [`LlmError::Schema`] when the service answers with text or with a value
/// that does not deserialize into `T`.
pub async fn complete_structured<T: StructuredOutput>(
    llm: &dyn CompletionService,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<T, LlmError> {
    let schema = T::output_schema();
    match llm.complete(system_prompt, user_prompt, Some(&schema)).await? {
        Completion::Structured(value) => serde_json::from_value(value)
            .map_err(|e| LlmError::Schema(format!("{}: {}", schema.name, e))),
        Completion::Text(_) => Err(LlmError::Schema(format!(
            "{}: expected structured output, got text",
            schema.name
        ))),
    }
}

/// Asks for free text (no schema).
pub async fn complete_text(
    llm: &dyn CompletionService,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String, LlmError> {
    Ok(llm.complete(system_prompt, user_prompt, None).await?.into_text())
}
