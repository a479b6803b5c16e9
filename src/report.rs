//! Markdown rendering for the final committee report
//!
//! Builds the full deliberation document: input echo, forensic findings,
//! strategy draft, and the critic's revision. JSON serialization of the
//! aggregate is plain serde on `CommitteeReport`.

use crate::models::{CommitteeReport, Severity};

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "HIGH",
        Severity::Medium => "MEDIUM",
        Severity::Low => "LOW",
    }
}

/// Render the committee report as a Markdown document, echoing the raw
/// input the committee deliberated over.
pub fn render_markdown(report: &CommitteeReport, input_data: &str) -> String {
    let mut out = String::new();

    out.push_str("# Sovereign Audit Committee Report\n\n");
    out.push_str(&format!(
        "Report `{}` — generated {}\n\n",
        report.report_id,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("## Input Data\n\n```\n");
    out.push_str(input_data.trim());
    out.push_str("\n```\n\n---\n\n");

    // ── Forensic findings ──
    out.push_str("## Forensic Investigator — Findings\n\n");
    let forensic = &report.forensic_report;
    if forensic.violations.is_empty() {
        out.push_str("No policy violations identified.\n\n");
    } else {
        out.push_str("| Transaction | Rule Broken | Severity | Approval Chain |\n");
        out.push_str("|-------------|-------------|----------|----------------|\n");
        for violation in &forensic.violations {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                violation.transaction_id,
                violation.rule,
                severity_label(violation.severity),
                violation.approval_issue,
            ));
        }
        out.push('\n');
    }
    out.push_str(&format!("**Summary:** {}\n\n---\n\n", forensic.summary));

    // ── Strategy ──
    out.push_str("## Risk Strategist — Financial Impact & Mitigation\n\n");
    let strategy = &report.strategy_draft;
    out.push_str(&format!("- **Risk Rating:** {:?}\n", strategy.risk_rating));
    out.push_str(&format!(
        "- **Total Exposure:** ${:.2}\n",
        strategy.total_exposure_usd
    ));
    out.push_str(&format!(
        "- **Quarterly Budget Impact:** {:.2}%\n\n",
        strategy.quarterly_budget_impact_pct
    ));
    out.push_str("**Mitigations:**\n\n");
    for (i, mitigation) in strategy.mitigations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, mitigation));
    }
    out.push_str("\n---\n\n");

    // ── Critic ──
    out.push_str("## Executive Critic — Quality Review & Revised Strategy\n\n");
    let critic = &report.critic_feedback;
    for (i, weakness) in critic.weaknesses.iter().enumerate() {
        out.push_str(&format!("**[WEAKNESS {}]** {}\n\n", i + 1, weakness));
    }
    out.push_str("**[REVISED STRATEGY]**\n\n");
    out.push_str(&critic.revised_strategy);
    out.push('\n');

    out
}
