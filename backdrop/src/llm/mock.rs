//! Mock completion service for tests.
//!
//! Answers from a script keyed by schema name (or a free-text answer when no schema is
//! requested), or from a closure for prompt-dependent answers. Every call is recorded
//! so tests can assert how many LLM calls a run made and with which prompts.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Completion, CompletionService, LlmError, OutputSchema};

/// One recorded call to [`MockLlm::complete`].
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionCall {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Schema name, `None` for free-text calls.
    pub schema: Option<String>,
}

type Responder = Box<dyn Fn(&CompletionCall) -> Result<Completion, LlmError> + Send + Sync>;

/// Scripted completion service.
///
/// Lookup order: `from_fn` responder, then a per-schema failure, then the per-schema
/// structured answer (or the text answer for free-text calls). Anything unscripted
/// answers with [`LlmError::Api`].
#[derive(Default)]
pub struct MockLlm {
    responder: Option<Responder>,
    structured: HashMap<String, serde_json::Value>,
    failures: HashMap<String, String>,
    text: Option<String>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every call with `f(call)`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&CompletionCall) -> Result<Completion, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            ..Self::default()
        }
    }

    /// Answers calls under schema `name` with `value` (returned as-is, not validated).
    pub fn with_structured(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.structured.insert(name.into(), value);
        self
    }

    /// Fails calls under schema `name` with an API error.
    pub fn with_failure(mut self, name: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(name.into(), message.into());
        self
    }

    /// Answers free-text calls with `text`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of calls made under schema `name`.
    pub fn call_count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.schema.as_deref() == Some(name))
            .count()
    }

    fn scripted(&self, call: &CompletionCall) -> Result<Completion, LlmError> {
        if let Some(ref f) = self.responder {
            return f(call);
        }
        match call.schema {
            Some(ref name) => {
                if let Some(msg) = self.failures.get(name) {
                    return Err(LlmError::Api(msg.clone()));
                }
                self.structured
                    .get(name)
                    .cloned()
                    .map(Completion::Structured)
                    .ok_or_else(|| LlmError::Api(format!("no scripted answer for schema {}", name)))
            }
            None => self
                .text
                .clone()
                .map(Completion::Text)
                .ok_or_else(|| LlmError::Api("no scripted text answer".to_string())),
        }
    }
}

#[async_trait]
impl CompletionService for MockLlm {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema: Option<&OutputSchema>,
    ) -> Result<Completion, LlmError> {
        let call = CompletionCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            schema: schema.map(|s| s.name.clone()),
        };
        let out = self.scripted(&call);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        out
    }
}
