//! Pipeline stages
//!
//! A plain stage is one structured generation whose result passes through
//! unmodified. A quality-gated stage wraps the same call in a bounded
//! blind-retry loop: every attempt reuses the identical prompt, rejected
//! candidates are discarded entirely, and nothing is returned unless the
//! acceptance predicate holds.

use crate::error::CommitteeError;
use crate::generator::{GenerationRequest, Generator, StructuredClient};
use crate::models::OutputShape;
use crate::Result;
use tracing::{info, warn};

/// One named step of the fixed pipeline.
pub struct StageSpec {
    pub name: &'static str,
    pub system_instruction: &'static str,
    pub temperature: f32,
}

impl StageSpec {
    fn request(&self, prompt: String) -> GenerationRequest {
        GenerationRequest {
            system_instruction: self.system_instruction.to_string(),
            prompt,
            temperature: self.temperature,
        }
    }
}

/// Outcome of judging one gate candidate.
pub struct GateVerdict {
    pub accepted: bool,
    /// Human-readable measurement for the observer, e.g. "1 weakness identified"
    pub detail: String,
}

/// Advisory progress notifications.
///
/// Implementations must never influence control flow; the pipeline behaves
/// identically under `NoopObserver`.
pub trait StageObserver: Send + Sync {
    fn stage_started(&self, _stage: &str) {}

    /// One quality-gate attempt finished, accepted or rejected.
    fn attempt_finished(
        &self,
        _stage: &str,
        _attempt: u32,
        _max_attempts: u32,
        _accepted: bool,
        _detail: &str,
    ) {
    }

    fn pipeline_complete(&self) {}
}

/// Silent observer for headless runs and tests
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

/// Observer that narrates progress through `tracing`
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage_started(&self, stage: &str) {
        info!(stage = stage, "Stage deliberating");
    }

    fn attempt_finished(
        &self,
        stage: &str,
        attempt: u32,
        max_attempts: u32,
        accepted: bool,
        detail: &str,
    ) {
        if accepted {
            info!(
                stage = stage,
                attempt = attempt,
                max_attempts = max_attempts,
                detail = detail,
                "Quality gate passed"
            );
        } else {
            warn!(
                stage = stage,
                attempt = attempt,
                max_attempts = max_attempts,
                detail = detail,
                "Quality gate rejected candidate - retrying"
            );
        }
    }

    fn pipeline_complete(&self) {
        info!("Committee deliberation complete");
    }
}

/// Run a plain stage: one structured generation, no retry. Failures
/// propagate unchanged to the orchestrator.
pub async fn run_stage<G, T>(
    client: &StructuredClient<G>,
    spec: &StageSpec,
    prompt: String,
    observer: &dyn StageObserver,
) -> Result<T>
where
    G: Generator,
    T: OutputShape,
{
    observer.stage_started(spec.name);
    client.generate(&spec.request(prompt)).await
}

/// Run a quality-gated stage: up to `max_attempts` independent generations,
/// returning the first accepted candidate. Exhausting the budget fails the
/// stage; the last rejected candidate is never returned.
pub async fn run_gated_stage<G, T, P>(
    client: &StructuredClient<G>,
    spec: &StageSpec,
    prompt: String,
    max_attempts: u32,
    judge: P,
    observer: &dyn StageObserver,
) -> Result<T>
where
    G: Generator,
    T: OutputShape,
    P: Fn(&T) -> GateVerdict,
{
    observer.stage_started(spec.name);
    let request = spec.request(prompt);

    for attempt in 1..=max_attempts {
        let candidate: T = client.generate(&request).await?;
        let verdict = judge(&candidate);

        observer.attempt_finished(
            spec.name,
            attempt,
            max_attempts,
            verdict.accepted,
            &verdict.detail,
        );

        if verdict.accepted {
            return Ok(candidate);
        }
        // Rejected candidate is discarded; the next attempt sees the same prompt.
    }

    Err(CommitteeError::QualityGateExhausted {
        stage: spec.name,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::ScriptedGenerator;
    use crate::models::CriticFeedback;
    use std::sync::{Arc, Mutex};

    const TEST_STAGE: StageSpec = StageSpec {
        name: "Executive Critic",
        system_instruction: "You are the critic.",
        temperature: 0.6,
    };

    fn critic_json(weaknesses: &[&str]) -> String {
        serde_json::json!({
            "weaknesses": weaknesses,
            "revisedStrategy": "Tighter controls with named owners."
        })
        .to_string()
    }

    fn weakness_gate(candidate: &CriticFeedback) -> GateVerdict {
        let found = candidate.weaknesses.len();
        GateVerdict {
            accepted: found >= 2,
            detail: format!("{} weakness(es) identified", found),
        }
    }

    /// Records every notification so tests can assert the observer saw
    /// the full attempt history without affecting the pipeline.
    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl StageObserver for RecordingObserver {
        fn stage_started(&self, stage: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{}", stage));
        }

        fn attempt_finished(
            &self,
            _stage: &str,
            attempt: u32,
            _max_attempts: u32,
            accepted: bool,
            detail: &str,
        ) {
            self.events
                .lock()
                .unwrap()
                .push(format!("attempt:{}:{}:{}", attempt, accepted, detail));
        }

        fn pipeline_complete(&self) {
            self.events.lock().unwrap().push("complete".to_string());
        }
    }

    #[tokio::test]
    async fn test_gate_accepts_first_attempt_without_further_calls() {
        let backend = Arc::new(
            ScriptedGenerator::new()
                .ok(critic_json(&["vague owners", "no deadline"]))
                .ok(critic_json(&["should never be requested", "x"])),
        );
        let client = StructuredClient::new(Arc::clone(&backend));

        let result: CriticFeedback = run_gated_stage(
            &client,
            &TEST_STAGE,
            "critique".to_string(),
            3,
            weakness_gate,
            &NoopObserver,
        )
        .await
        .unwrap();

        assert_eq!(result.weaknesses.len(), 2);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_gate_returns_third_candidate_after_two_rejections() {
        let backend = Arc::new(
            ScriptedGenerator::new()
                .ok(critic_json(&["only one"]))
                .ok(critic_json(&[]))
                .ok(critic_json(&["no ownership", "no timeline", "no budget"])),
        );
        let client = StructuredClient::new(Arc::clone(&backend));

        let result: CriticFeedback = run_gated_stage(
            &client,
            &TEST_STAGE,
            "critique".to_string(),
            3,
            weakness_gate,
            &NoopObserver,
        )
        .await
        .unwrap();

        // Third candidate is returned unchanged.
        assert_eq!(
            result.weaknesses,
            vec!["no ownership", "no timeline", "no budget"]
        );
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_gate_exhaustion_fails_instead_of_returning_last_candidate() {
        let backend = Arc::new(
            ScriptedGenerator::new()
                .ok(critic_json(&["one"]))
                .ok(critic_json(&["one"]))
                .ok(critic_json(&["one"])),
        );
        let client = StructuredClient::new(Arc::clone(&backend));

        let result: Result<CriticFeedback> = run_gated_stage(
            &client,
            &TEST_STAGE,
            "critique".to_string(),
            3,
            weakness_gate,
            &NoopObserver,
        )
        .await;

        assert_eq!(backend.call_count(), 3);
        match result {
            Err(CommitteeError::QualityGateExhausted { stage, attempts }) => {
                assert_eq!(stage, "Executive Critic");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected QualityGateExhausted, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_gate_propagates_generation_failure_immediately() {
        // A backend failure inside the gate is not a rejection - it aborts
        // the stage without consuming the remaining attempts.
        let backend = Arc::new(ScriptedGenerator::new().err("backend unreachable"));
        let client = StructuredClient::new(Arc::clone(&backend));

        let result: Result<CriticFeedback> = run_gated_stage(
            &client,
            &TEST_STAGE,
            "critique".to_string(),
            3,
            weakness_gate,
            &NoopObserver,
        )
        .await;

        assert!(matches!(
            result,
            Err(CommitteeError::GenerationFailure(_))
        ));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_every_attempt_outcome() {
        let backend = ScriptedGenerator::new()
            .ok(critic_json(&["only one"]))
            .ok(critic_json(&["w1", "w2"]));
        let client = StructuredClient::new(backend);
        let observer = RecordingObserver::default();

        let _: CriticFeedback = run_gated_stage(
            &client,
            &TEST_STAGE,
            "critique".to_string(),
            3,
            weakness_gate,
            &observer,
        )
        .await
        .unwrap();

        let events = observer.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start:Executive Critic",
                "attempt:1:false:1 weakness(es) identified",
                "attempt:2:true:2 weakness(es) identified",
            ]
        );
    }
}
