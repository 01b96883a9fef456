//! Pipeline error type.
//!
//! Separates runs that did not converge (exit code 2) from tool failures
//! such as I/O, configuration or plan validation errors (exit code 1).

use portfix_domain::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// The repair loop ended without a successful build.
    #[error("heal did not converge: {category} after {attempts} build attempt(s)")]
    HealFailed {
        category: &'static str,
        attempts: u32,
    },

    /// The oracle's plan proposal was rejected.
    #[error(transparent)]
    InvalidPlan(#[from] ValidationError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn is_heal_failure(&self) -> bool {
        matches!(self, ToolError::HealFailed { .. })
    }

    /// Returns the recommended process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::HealFailed { .. } => 2,
            ToolError::InvalidPlan(_) | ToolError::Internal(_) => 1,
        }
    }
}
