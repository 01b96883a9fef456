use crate::diagnostic::DiagnosticSet;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Record of one build-then-repair cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairAttempt {
    /// 1-based attempt index.
    pub attempt: u32,
    pub build_succeeded: bool,

    /// Merged stdout/stderr of the build.
    #[serde(skip)]
    pub raw_output: String,

    #[serde(default)]
    pub diagnostics: DiagnosticSet,

    /// Sha256 over the diagnostic set; absent for successful builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<FileRepair>,
}

impl RepairAttempt {
    pub fn repaired_count(&self) -> usize {
        self.repairs
            .iter()
            .filter(|r| r.status == RepairStatus::Repaired)
            .count()
    }
}

/// Result of dispatching one file to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRepair {
    pub path: Utf8PathBuf,
    pub status: RepairStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    Repaired,
    FileNotFound,
    OutsideProject,
    OracleFailed,
    WriteFailed,
}

impl RepairStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Repaired => "repaired",
            RepairStatus::FileNotFound => "file_not_found",
            RepairStatus::OutsideProject => "outside_project",
            RepairStatus::OracleFailed => "oracle_failed",
            RepairStatus::WriteFailed => "write_failed",
        }
    }
}

/// Terminal state of the repair loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoopOutcome {
    /// The build succeeded on `attempt`.
    Succeeded { attempt: u32 },

    /// The build failed but no diagnostic matched the grammar.
    ParseFailed { attempt: u32, raw_output: String },

    /// Every permitted attempt still produced diagnostics.
    Exhausted {
        attempts: u32,
        last_diagnostics: DiagnosticSet,
    },

    /// Two consecutive attempts produced the same diagnostics and the loop
    /// was configured to halt on non-progress.
    Stalled {
        attempt: u32,
        last_diagnostics: DiagnosticSet,
    },

    /// Stopped at a cooperative checkpoint.
    Cancelled { attempt: u32 },
}

impl LoopOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoopOutcome::Succeeded { .. })
    }

    /// Short category label used in reports and logs.
    pub fn category(&self) -> &'static str {
        match self {
            LoopOutcome::Succeeded { .. } => "succeeded",
            LoopOutcome::ParseFailed { .. } => "parse_failed",
            LoopOutcome::Exhausted { .. } => "retry_exhausted",
            LoopOutcome::Stalled { .. } => "stalled",
            LoopOutcome::Cancelled { .. } => "cancelled",
        }
    }

    pub fn last_diagnostics(&self) -> Option<&DiagnosticSet> {
        match self {
            LoopOutcome::Exhausted {
                last_diagnostics, ..
            }
            | LoopOutcome::Stalled {
                last_diagnostics, ..
            } => Some(last_diagnostics),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_succeeded_is_success() {
        assert!(LoopOutcome::Succeeded { attempt: 1 }.is_success());
        assert!(
            !LoopOutcome::ParseFailed {
                attempt: 1,
                raw_output: String::new()
            }
            .is_success()
        );
        assert!(
            !LoopOutcome::Exhausted {
                attempts: 3,
                last_diagnostics: DiagnosticSet::new()
            }
            .is_success()
        );
        assert!(!LoopOutcome::Cancelled { attempt: 2 }.is_success());
    }

    #[test]
    fn categories_are_distinct() {
        let parse = LoopOutcome::ParseFailed {
            attempt: 1,
            raw_output: String::new(),
        };
        let exhausted = LoopOutcome::Exhausted {
            attempts: 3,
            last_diagnostics: DiagnosticSet::new(),
        };
        assert_eq!(parse.category(), "parse_failed");
        assert_eq!(exhausted.category(), "retry_exhausted");
    }
}
