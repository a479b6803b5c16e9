//! Audit Committee Orchestrator
//!
//! A three-agent sequential pipeline over flagged expense data:
//! - Forensic Investigator: identifies specific policy violations
//! - Risk Strategist: quantifies financial impact and drafts mitigations
//! - Executive Critic: quality gate, must find at least two weaknesses
//!
//! Each agent's structured output becomes the next agent's input. The
//! Critic runs behind a bounded blind-retry quality gate; any failure
//! aborts the whole deliberation with no partial report.
//!
//! PIPELINE:
//! INPUT → FORENSIC → STRATEGIST → CRITIC (gated) → COMMITTEE REPORT

pub mod committee;
pub mod error;
pub mod generator;
pub mod models;
pub mod prompts;
pub mod report;
pub mod stage;

pub use error::{CommitteeError, Result};

// Re-export common types
pub use committee::Committee;
pub use models::*;
