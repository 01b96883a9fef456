//! The build-diagnose-repair loop.
//!
//! ```text
//! BUILDING -> SUCCEEDED                      (build passed)
//!          -> PARSE_FAILED                   (build failed, nothing parsed)
//!          -> REPAIRING -> BUILDING ...      (one dispatch per file)
//!          -> EXHAUSTED                      (max_retries builds used)
//! ```
//!
//! The loop is strictly sequential: the build observes the whole tree, and
//! repairs made during an attempt are only seen by the next build.

use crate::cancel::CancellationToken;
use crate::dispatch::{RepairContext, repair_file};
use crate::error::ToolError;
use crate::ports::{BuildInvoker, Oracle, RepoView, WritePort};
use crate::settings::HealSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use portfix_diagnostics::extract;
use portfix_render::render_heal_md;
use portfix_types::attempt::{LoopOutcome, RepairAttempt};
use portfix_types::diagnostic::DiagnosticSet;
use portfix_types::report::{HealReport, HealRunInfo, ToolInfo};
use sha2::{Digest, Sha256};
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of [`run_repair_loop`].
#[derive(Debug, Clone)]
pub struct HealOutcome {
    pub outcome: LoopOutcome,
    pub attempts: Vec<RepairAttempt>,
    pub report: HealReport,
}

impl HealOutcome {
    /// Number of builds the loop ran.
    pub fn builds(&self) -> u32 {
        u32::try_from(self.attempts.len()).unwrap_or(u32::MAX)
    }

    /// Convert a non-converged run into [`ToolError::HealFailed`].
    pub fn ensure_success(&self) -> Result<(), ToolError> {
        if self.outcome.is_success() {
            Ok(())
        } else {
            Err(ToolError::HealFailed {
                category: self.outcome.category(),
                attempts: self.builds(),
            })
        }
    }
}

/// Run the repair loop against the project at `settings.project_root`.
///
/// Only a failing build invoker aborts the loop; every per-file problem is
/// recorded in the attempt's repairs.
pub fn run_repair_loop(
    settings: &HealSettings,
    build: &dyn BuildInvoker,
    repo: &dyn RepoView,
    oracle: &dyn Oracle,
    writer: &dyn WritePort,
    cancel: &CancellationToken,
    tool: ToolInfo,
) -> Result<HealOutcome, ToolError> {
    let started_at = Utc::now();
    let clock = Instant::now();
    let ctx = RepairContext {
        repo,
        oracle,
        writer,
        languages: &settings.languages,
    };

    let (outcome, attempts) = drive(settings, build, &ctx, cancel)?;

    match &outcome {
        LoopOutcome::Succeeded { attempt } => info!(attempt, "build succeeded"),
        other => error!(
            outcome = other.category(),
            builds = attempts.len(),
            "heal did not converge"
        ),
    }

    let run = HealRunInfo {
        run_id: uuid::Uuid::new_v4().to_string(),
        started_at: started_at.to_rfc3339(),
        ended_at: Some(Utc::now().to_rfc3339()),
        duration_ms: Some(clock.elapsed().as_millis() as u64),
        project_root: settings.project_root.to_string(),
    };
    let report = HealReport::new(tool, run, settings.max_retries, &outcome, &attempts);

    Ok(HealOutcome {
        outcome,
        attempts,
        report,
    })
}

fn drive(
    settings: &HealSettings,
    build: &dyn BuildInvoker,
    ctx: &RepairContext<'_>,
    cancel: &CancellationToken,
) -> anyhow::Result<(LoopOutcome, Vec<RepairAttempt>)> {
    let mut attempts: Vec<RepairAttempt> = Vec::new();
    let mut previous_fingerprint: Option<String> = None;
    let mut last_diagnostics = DiagnosticSet::new();

    for attempt in 1..=settings.max_retries {
        if cancel.is_cancelled() {
            return Ok((
                LoopOutcome::Cancelled {
                    attempt: attempt - 1,
                },
                attempts,
            ));
        }

        info!(attempt, max = settings.max_retries, "building");
        let out = build
            .run()
            .with_context(|| format!("run build (attempt {attempt})"))?;

        if out.success {
            attempts.push(RepairAttempt {
                attempt,
                build_succeeded: true,
                raw_output: out.output,
                diagnostics: DiagnosticSet::new(),
                fingerprint: None,
                repairs: Vec::new(),
            });
            return Ok((LoopOutcome::Succeeded { attempt }, attempts));
        }

        let diagnostics = extract(&out.output, &settings.project_root, &settings.grammar);
        if diagnostics.is_empty() {
            warn!(attempt, "build failed but no diagnostic matched the grammar");
            attempts.push(RepairAttempt {
                attempt,
                build_succeeded: false,
                raw_output: out.output.clone(),
                diagnostics,
                fingerprint: None,
                repairs: Vec::new(),
            });
            return Ok((
                LoopOutcome::ParseFailed {
                    attempt,
                    raw_output: out.output,
                },
                attempts,
            ));
        }

        let fp = fingerprint(&diagnostics);
        info!(
            attempt,
            files = diagnostics.file_count(),
            diagnostics = diagnostics.total(),
            "build failed"
        );

        if previous_fingerprint.as_deref() == Some(fp.as_str()) {
            warn!(attempt, fingerprint = %fp, "diagnostics unchanged since previous attempt");
            if settings.halt_on_stall {
                attempts.push(RepairAttempt {
                    attempt,
                    build_succeeded: false,
                    raw_output: out.output,
                    diagnostics: diagnostics.clone(),
                    fingerprint: Some(fp),
                    repairs: Vec::new(),
                });
                return Ok((
                    LoopOutcome::Stalled {
                        attempt,
                        last_diagnostics: diagnostics,
                    },
                    attempts,
                ));
            }
        }

        let mut repairs = Vec::with_capacity(diagnostics.file_count());
        let mut cancelled = false;
        for (path, list) in &diagnostics {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            repairs.push(repair_file(path, list, ctx));
        }

        attempts.push(RepairAttempt {
            attempt,
            build_succeeded: false,
            raw_output: out.output,
            diagnostics: diagnostics.clone(),
            fingerprint: Some(fp.clone()),
            repairs,
        });

        if cancelled {
            warn!(attempt, "repair cancelled between files");
            return Ok((LoopOutcome::Cancelled { attempt }, attempts));
        }

        previous_fingerprint = Some(fp);
        last_diagnostics = diagnostics;
    }

    Ok((
        LoopOutcome::Exhausted {
            attempts: settings.max_retries,
            last_diagnostics,
        },
        attempts,
    ))
}

/// Stable sha256 over a diagnostic set.
pub fn fingerprint(set: &DiagnosticSet) -> String {
    let mut hasher = Sha256::new();
    for (path, list) in set {
        hasher.update(path.as_str().as_bytes());
        hasher.update([0u8]);
        for d in list {
            hasher.update(d.line.to_le_bytes());
            hasher.update(d.column.map_or(0, |c| c.wrapping_add(1)).to_le_bytes());
            hasher.update(d.message.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xffu8]);
    }
    hex::encode(hasher.finalize())
}

/// Write `heal.json` and `heal.md` to `out_dir`.
pub fn write_heal_artifacts(
    outcome: &HealOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let json = serde_json::to_string_pretty(&outcome.report).context("serialize heal report")?;
    writer.write_file(&out_dir.join("heal.json"), json.as_bytes())?;

    let md = render_heal_md(&outcome.report);
    writer.write_file(&out_dir.join("heal.md"), md.as_bytes())?;

    Ok(())
}
