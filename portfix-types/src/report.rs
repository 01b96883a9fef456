use crate::attempt::{FileRepair, LoopOutcome, RepairAttempt};
use crate::diagnostic::DiagnosticSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// On-disk summary of one repair-loop run (`heal.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: HealRunInfo,
    pub max_retries: u32,
    pub success: bool,

    /// See `LoopOutcome::category`.
    pub outcome: String,

    #[serde(default)]
    pub attempts: Vec<AttemptSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_diagnostics: Option<DiagnosticSet>,

    /// Raw build output kept for operator triage when nothing could be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl HealReport {
    pub fn new(
        tool: ToolInfo,
        run: HealRunInfo,
        max_retries: u32,
        outcome: &LoopOutcome,
        attempts: &[RepairAttempt],
    ) -> Self {
        let raw_output = match outcome {
            LoopOutcome::ParseFailed { raw_output, .. } => Some(raw_output.clone()),
            _ => None,
        };
        Self {
            schema: crate::schema::PORTFIX_HEAL_V1.to_string(),
            tool,
            run,
            max_retries,
            success: outcome.is_success(),
            outcome: outcome.category().to_string(),
            attempts: attempts.iter().map(AttemptSummary::from).collect(),
            final_diagnostics: outcome.last_diagnostics().cloned(),
            raw_output,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealRunInfo {
    pub run_id: String,
    pub started_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    pub project_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempt: u32,
    pub build_succeeded: bool,
    pub files_with_diagnostics: u64,
    pub diagnostics_total: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<FileRepair>,
}

impl From<&RepairAttempt> for AttemptSummary {
    fn from(a: &RepairAttempt) -> Self {
        Self {
            attempt: a.attempt,
            build_succeeded: a.build_succeeded,
            files_with_diagnostics: a.diagnostics.file_count() as u64,
            diagnostics_total: a.diagnostics.total() as u64,
            fingerprint: a.fingerprint.clone(),
            repairs: a.repairs.clone(),
        }
    }
}
