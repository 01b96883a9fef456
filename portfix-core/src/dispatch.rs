//! Repair dispatcher: one file, one oracle call, one full overwrite.

use crate::ports::{Oracle, OracleError, RepoView, WritePort};
use camino::{Utf8Component, Utf8Path};
use portfix_domain::{LanguagePair, repair_request, strip_fence};
use portfix_types::attempt::{FileRepair, RepairStatus};
use portfix_types::diagnostic::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, warn};

/// What a repair needs besides the file and its diagnostics.
pub struct RepairContext<'a> {
    pub repo: &'a dyn RepoView,
    pub oracle: &'a dyn Oracle,
    pub writer: &'a dyn WritePort,
    pub languages: &'a LanguagePair,
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("{0} is outside the project root")]
    OutsideProject(String),

    #[error("{0} does not exist")]
    FileNotFound(String),

    #[error("read {path}: {cause:#}")]
    Read { path: String, cause: anyhow::Error },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("write {path}: {cause:#}")]
    Write { path: String, cause: anyhow::Error },
}

impl RepairError {
    pub fn status(&self) -> RepairStatus {
        match self {
            RepairError::OutsideProject(_) => RepairStatus::OutsideProject,
            RepairError::FileNotFound(_) | RepairError::Read { .. } => RepairStatus::FileNotFound,
            RepairError::Oracle(_) => RepairStatus::OracleFailed,
            RepairError::Write { .. } => RepairStatus::WriteFailed,
        }
    }
}

/// Repair one file and report what happened. Never fails the caller.
pub fn repair_file(
    path: &Utf8Path,
    diagnostics: &[Diagnostic],
    ctx: &RepairContext<'_>,
) -> FileRepair {
    match try_repair_file(path, diagnostics, ctx) {
        Ok(()) => {
            info!(path = %path, diagnostics = diagnostics.len(), "repaired");
            FileRepair {
                path: path.to_path_buf(),
                status: RepairStatus::Repaired,
                message: None,
            }
        }
        Err(err) => {
            warn!(path = %path, status = err.status().as_str(), "repair skipped: {}", err);
            FileRepair {
                path: path.to_path_buf(),
                status: err.status(),
                message: Some(err.to_string()),
            }
        }
    }
}

/// Read the file, ask the oracle for a full replacement, strip one fence
/// layer and overwrite the file.
pub fn try_repair_file(
    path: &Utf8Path,
    diagnostics: &[Diagnostic],
    ctx: &RepairContext<'_>,
) -> Result<(), RepairError> {
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Utf8Component::ParentDir))
    {
        return Err(RepairError::OutsideProject(path.to_string()));
    }
    if !ctx.repo.exists(path) {
        return Err(RepairError::FileNotFound(path.to_string()));
    }

    let code = ctx
        .repo
        .read_to_string(path)
        .map_err(|cause| RepairError::Read {
            path: path.to_string(),
            cause,
        })?;

    let req = repair_request(path.as_str(), diagnostics, &code, ctx.languages);
    let response = ctx.oracle.generate(&req.prompt, &req.system_instruction)?;
    let fixed = strip_fence(&response);
    debug!(
        path = %path,
        before = code.len(),
        after = fixed.len(),
        "oracle returned replacement"
    );

    let abs = ctx.repo.root().join(path);
    ctx.writer
        .write_file(&abs, fixed.as_bytes())
        .map_err(|cause| RepairError::Write {
            path: path.to_string(),
            cause,
        })
}
