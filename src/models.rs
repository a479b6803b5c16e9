//! Structured output shapes for the three committee agents
//!
//! Each stage declares its expected backend output as a plain serde type.
//! Constraints serde cannot express (numeric ranges, fixed-length sequences)
//! live in `OutputShape::validate` and are enforced at the client boundary,
//! so malformed data never flows downstream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskRating {
    Critical,
    High,
    Moderate,
    Low,
}

//
// ================= Shape validation =================
//

/// Field-level constraints beyond what deserialization enforces.
///
/// The structured client runs `validate` on every backend response and
/// reports violations as generation failures.
pub trait OutputShape: serde::de::DeserializeOwned + Serialize {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

//
// ================= Stage 1: Forensic Investigator =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub transaction_id: String,
    /// Exact policy rule broken
    pub rule: String,
    pub severity: Severity,
    /// Finding on the approval chain
    pub approval_issue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForensicReport {
    pub violations: Vec<Violation>,
    /// Overall forensic assessment
    pub summary: String,
}

impl OutputShape for ForensicReport {}

//
// ================= Stage 2: Risk Strategist =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyDraft {
    pub risk_rating: RiskRating,
    /// Total financial exposure in USD
    pub total_exposure_usd: f64,
    /// Percentage of the quarterly budget at risk
    pub quarterly_budget_impact_pct: f64,
    /// Exactly three mitigation strategies
    pub mitigations: Vec<String>,
}

pub const REQUIRED_MITIGATIONS: usize = 3;

impl OutputShape for StrategyDraft {
    fn validate(&self) -> std::result::Result<(), String> {
        if !self.total_exposure_usd.is_finite() || self.total_exposure_usd < 0.0 {
            return Err(format!(
                "totalExposureUsd must be a non-negative number, got {}",
                self.total_exposure_usd
            ));
        }
        if !self.quarterly_budget_impact_pct.is_finite() {
            return Err(format!(
                "quarterlyBudgetImpactPct must be a finite number, got {}",
                self.quarterly_budget_impact_pct
            ));
        }
        if self.mitigations.len() != REQUIRED_MITIGATIONS {
            return Err(format!(
                "expected exactly {} mitigations, got {}",
                REQUIRED_MITIGATIONS,
                self.mitigations.len()
            ));
        }
        Ok(())
    }
}

//
// ================= Stage 3: Executive Critic =================
//

/// The ≥2 weaknesses invariant is the quality gate's responsibility,
/// not a deserialization constraint; a one-weakness candidate is a
/// well-formed value that the gate rejects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CriticFeedback {
    pub weaknesses: Vec<String>,
    /// Improved strategy addressing every weakness
    pub revised_strategy: String,
}

impl OutputShape for CriticFeedback {}

//
// ================= Terminal aggregate =================
//

/// Read-only bundle of the three stage outputs. Assembled once by the
/// orchestrator after all stages succeed; no further lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeReport {
    pub report_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub forensic_report: ForensicReport,
    pub strategy_draft: StrategyDraft,
    pub critic_feedback: CriticFeedback,
}

impl CommitteeReport {
    pub fn new(
        forensic_report: ForensicReport,
        strategy_draft: StrategyDraft,
        critic_feedback: CriticFeedback,
    ) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            forensic_report,
            strategy_draft,
            critic_feedback,
        }
    }
}
