//! Agent personas for the Sovereign Audit Committee
//!
//! Each stage has a fixed system instruction, a prompt template that embeds
//! the previous stage's output as serialized text, and a sampling temperature.

use crate::stage::StageSpec;

pub const FORENSIC_SYSTEM: &str = "You are the Forensic Investigator on the Sovereign Audit Committee. \
Analyze raw expense data and identify SPECIFIC policy violations. \
For each flagged transaction: state the exact rule broken, assign severity \
(HIGH/MEDIUM/LOW), and assess whether the approval chain was correctly followed. \
Be exhaustive and structured. Return valid JSON matching the required schema.";

pub const STRATEGIST_SYSTEM: &str = "You are the Risk Strategist on the Sovereign Audit Committee. \
You receive forensic findings and assess FINANCIAL IMPACT on the quarterly budget. \
Quantify total exposure, percentage of budget at risk, and assign a Risk Rating. \
Propose exactly three specific mitigation strategies with projected savings. \
Return valid JSON matching the required schema.";

pub const CRITIC_SYSTEM: &str = "You are the Executive Critic on the Sovereign Audit Committee. \
Your role is QUALITY CONTROL: you are demanding and rigorous. \
You MUST identify AT LEAST TWO specific weaknesses in the strategy presented. \
Then provide a REVISED strategy that directly addresses each weakness. \
Do not approve without revision, that is your mandate. \
Return valid JSON matching the required schema.";

pub const FORENSIC_STAGE: StageSpec = StageSpec {
    name: "Forensic Investigator",
    system_instruction: FORENSIC_SYSTEM,
    temperature: 0.3,
};

pub const STRATEGIST_STAGE: StageSpec = StageSpec {
    name: "Risk Strategist",
    system_instruction: STRATEGIST_SYSTEM,
    temperature: 0.4,
};

pub const CRITIC_STAGE: StageSpec = StageSpec {
    name: "Executive Critic",
    system_instruction: CRITIC_SYSTEM,
    temperature: 0.6,
};

/// Stage 1 prompt: the raw expense document is passed through as opaque text.
pub fn forensic_prompt(csv_data: &str) -> String {
    format!(
        "Analyze these flagged transactions for policy violations:\n\n{}\n\nReturn exhaustive findings as structured JSON.",
        csv_data
    )
}

/// Stage 2 prompt over the serialized forensic findings.
pub fn strategist_prompt(findings_json: &str) -> String {
    format!(
        "The Forensic Investigator has produced these findings:\n\n{}\n\nAssess the financial impact on the quarterly budget and propose three mitigation strategies. Return structured JSON.",
        findings_json
    )
}

/// Stage 3 prompt over the serialized strategy draft. Identical on every
/// gate attempt; rejected candidates are never fed back.
pub fn critic_prompt(strategy_json: &str) -> String {
    format!(
        "The Risk Strategist has produced this analysis:\n\n{}\n\nCritique this strategy. Find AT LEAST TWO weaknesses, then produce a revised version. Return structured JSON.",
        strategy_json
    )
}
