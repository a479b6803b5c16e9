//! Structured generation client
//!
//! The `Generator` trait is the seam to the model-serving backend; the
//! `StructuredClient` layers shape validation on top of a single raw call.
//! Retry policy, where it exists, belongs to the caller (see the stage
//! module), never to the client.

use crate::error::CommitteeError;
use crate::models::OutputShape;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tracing::error;

pub mod gemini;
pub use gemini::GeminiClient;

/// One generation call: a system instruction, a user prompt, and a
/// sampling temperature in [0, 1].
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Trait for the external generation backend (LLM controlled)
#[async_trait]
pub trait Generator: Send + Sync {
    /// Perform exactly one backend call and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request).await
    }
}

/// Typed wrapper over a `Generator`: one call, fence stripping,
/// deserialization into the requested shape, field-level validation.
/// Every conformance failure surfaces as a `GenerationFailure`.
pub struct StructuredClient<G: Generator> {
    backend: G,
}

impl<G: Generator> StructuredClient<G> {
    pub fn new(backend: G) -> Self {
        Self { backend }
    }

    pub async fn generate<T: OutputShape>(&self, request: &GenerationRequest) -> Result<T> {
        if request.system_instruction.trim().is_empty() || request.prompt.trim().is_empty() {
            return Err(CommitteeError::InvalidInput(
                "system instruction and prompt must be non-empty".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&request.temperature) {
            return Err(CommitteeError::InvalidInput(format!(
                "temperature {} outside [0, 1]",
                request.temperature
            )));
        }

        let raw = self.backend.generate(request).await?;
        let cleaned = strip_code_fences(&raw);

        let value: T = serde_json::from_str(cleaned).map_err(|e| {
            error!("Backend response does not match requested shape: {}", e);
            CommitteeError::GenerationFailure(format!(
                "response does not match requested shape: {} | raw={}",
                e, raw
            ))
        })?;

        value.validate().map_err(|reason| {
            error!("Backend response violates shape constraints: {}", reason);
            CommitteeError::GenerationFailure(format!(
                "response violates shape constraints: {}",
                reason
            ))
        })?;

        Ok(value)
    }
}

/// Strip a markdown ```json ... ``` fence when the model wraps its output
fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Scripted generator for development & testing.
/// Replays canned responses in order, without an LLM dependency, and
/// counts how many calls it has served.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: AtomicU32,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw response.
    pub fn ok(self, response: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Ok(response.into()));
        self
    }

    /// Queue a backend failure.
    pub fn err(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("script lock poisoned")
            .push_back(Err(message.into()));
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();

        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(CommitteeError::GenerationFailure(message)),
            None => Err(CommitteeError::GenerationFailure(
                "scripted generator exhausted".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CriticFeedback, StrategyDraft};

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_instruction: "You are a critic.".to_string(),
            prompt: "Critique this.".to_string(),
            temperature: 0.6,
        }
    }

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```json\n{\"weaknesses\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"weaknesses\": []}");

        let bare = "{\"weaknesses\": []}";
        assert_eq!(strip_code_fences(bare), bare);
    }

    #[tokio::test]
    async fn test_structured_client_parses_fenced_output() {
        let backend = ScriptedGenerator::new().ok(
            "```json\n{\"weaknesses\": [\"w1\", \"w2\"], \"revisedStrategy\": \"better\"}\n```",
        );
        let client = StructuredClient::new(backend);

        let feedback: CriticFeedback = client.generate(&request()).await.unwrap();
        assert_eq!(feedback.weaknesses.len(), 2);
        assert_eq!(feedback.revised_strategy, "better");
    }

    #[tokio::test]
    async fn test_malformed_output_is_generation_failure() {
        let backend = ScriptedGenerator::new().ok("not json at all");
        let client = StructuredClient::new(backend);

        let result = client.generate::<CriticFeedback>(&request()).await;
        assert!(matches!(
            result,
            Err(CommitteeError::GenerationFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_constraint_violation_is_generation_failure() {
        // Shape parses but carries only one mitigation.
        let backend = ScriptedGenerator::new().ok(
            r#"{"riskRating": "HIGH", "totalExposureUsd": 900.0, "quarterlyBudgetImpactPct": 2.0, "mitigations": ["only one"]}"#,
        );
        let client = StructuredClient::new(backend);

        let result = client.generate::<StrategyDraft>(&request()).await;
        match result {
            Err(CommitteeError::GenerationFailure(msg)) => {
                assert!(msg.contains("mitigations"));
            }
            other => panic!("expected GenerationFailure, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_temperature_is_rejected_before_any_call() {
        let backend = Arc::new(ScriptedGenerator::new().ok("{}"));
        let client = StructuredClient::new(Arc::clone(&backend));

        let mut bad = request();
        bad.temperature = 1.5;

        let result = client.generate::<CriticFeedback>(&bad).await;
        assert!(matches!(result, Err(CommitteeError::InvalidInput(_))));
        assert_eq!(backend.call_count(), 0);
    }
}
