//! Committee orchestrator - the fixed three-agent pipeline
//!
//! INPUT → FORENSIC → STRATEGIST → CRITIC (gated) → COMMITTEE REPORT
//!
//! Strictly sequential: each stage consumes the previous stage's output,
//! handed over by value as serialized text inside the next prompt. Any
//! stage failure aborts the whole deliberation; no partial report exists.

use crate::generator::{Generator, StructuredClient};
use crate::models::{CommitteeReport, CriticFeedback, ForensicReport, StrategyDraft};
use crate::prompts;
use crate::stage::{run_gated_stage, run_stage, GateVerdict, StageObserver, TracingObserver};
use crate::Result;
use tracing::info;

pub const CRITIC_MAX_ATTEMPTS: u32 = 3;
pub const MIN_WEAKNESSES: usize = 2;

/// The Sovereign Audit Committee: Forensic Investigator, Risk Strategist,
/// and quality-gated Executive Critic over one expense document.
pub struct Committee<G: Generator> {
    client: StructuredClient<G>,
    observer: Box<dyn StageObserver>,
    critic_max_attempts: u32,
}

impl<G: Generator> Committee<G> {
    pub fn new(backend: G) -> Self {
        Self::with_observer(backend, Box::new(TracingObserver))
    }

    pub fn with_observer(backend: G, observer: Box<dyn StageObserver>) -> Self {
        Self {
            client: StructuredClient::new(backend),
            observer,
            critic_max_attempts: CRITIC_MAX_ATTEMPTS,
        }
    }

    /// Run the full deliberation over the raw expense document.
    ///
    /// The document is passed through as opaque text; its encoding and
    /// schema are not validated here.
    pub async fn deliberate(&self, expense_data: &str) -> Result<CommitteeReport> {
        if expense_data.trim().is_empty() {
            return Err(crate::error::CommitteeError::InvalidInput(
                "expense document is empty".to_string(),
            ));
        }

        // === Stage 1: Forensic Investigator ===
        let forensic_report: ForensicReport = run_stage(
            &self.client,
            &prompts::FORENSIC_STAGE,
            prompts::forensic_prompt(expense_data),
            self.observer.as_ref(),
        )
        .await?;

        info!(
            violations = forensic_report.violations.len(),
            "Forensic findings received"
        );

        // === Stage 2: Risk Strategist ===
        let findings_json = serde_json::to_string_pretty(&forensic_report)?;
        let strategy_draft: StrategyDraft = run_stage(
            &self.client,
            &prompts::STRATEGIST_STAGE,
            prompts::strategist_prompt(&findings_json),
            self.observer.as_ref(),
        )
        .await?;

        info!(
            risk_rating = ?strategy_draft.risk_rating,
            exposure_usd = strategy_draft.total_exposure_usd,
            "Strategy draft received"
        );

        // === Stage 3: Executive Critic (quality-gated) ===
        let strategy_json = serde_json::to_string_pretty(&strategy_draft)?;
        let critic_feedback: CriticFeedback = run_gated_stage(
            &self.client,
            &prompts::CRITIC_STAGE,
            prompts::critic_prompt(&strategy_json),
            self.critic_max_attempts,
            |candidate: &CriticFeedback| {
                let found = candidate.weaknesses.len();
                GateVerdict {
                    accepted: found >= MIN_WEAKNESSES,
                    detail: format!("{} weakness(es) identified", found),
                }
            },
            self.observer.as_ref(),
        )
        .await?;

        self.observer.pipeline_complete();

        Ok(CommitteeReport::new(
            forensic_report,
            strategy_draft,
            critic_feedback,
        ))
    }
}
