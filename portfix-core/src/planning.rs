//! Migration planning: scan snapshot in, validated plan out.

use crate::error::ToolError;
use crate::ports::Oracle;
use anyhow::Context;
use portfix_domain::{LanguagePair, ValidateOptions, plan_request, validate_plan_with};
use portfix_types::plan::MigrationPlan;
use portfix_types::scan::ScanResult;
use tracing::info;

/// Ask the oracle for a migration plan and validate it.
///
/// Oracle failures are tool errors; a malformed proposal is
/// [`ToolError::InvalidPlan`] carrying the raw response.
pub fn create_plan(
    scan: &ScanResult,
    oracle: &dyn Oracle,
    langs: &LanguagePair,
    opts: &ValidateOptions,
) -> Result<MigrationPlan, ToolError> {
    info!(
        root = %scan.root_name,
        files = scan.files.len(),
        "requesting migration plan"
    );
    let req = plan_request(scan, langs);
    let raw = oracle
        .generate(&req.prompt, &req.system_instruction)
        .context("request migration plan")?;

    let plan = validate_plan_with(&raw, opts)?;
    info!(
        project = %plan.project_name,
        dependencies = plan.dependencies.len(),
        mappings = plan.file_mappings.len(),
        "migration plan accepted"
    );
    Ok(plan)
}
