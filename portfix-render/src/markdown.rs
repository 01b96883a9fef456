use portfix_types::report::HealReport;
use portfix_types::translate::{TranslationStatus, TranslationSummary};

/// Lines of raw build output shown when no diagnostic could be parsed.
const RAW_TAIL_LINES: usize = 40;

pub fn render_heal_md(report: &HealReport) -> String {
    let mut out = String::new();
    out.push_str("# portfix heal\n\n");
    out.push_str(&format!("- Project: `{}`\n", report.run.project_root));
    out.push_str(&format!("- Outcome: `{}`\n", report.outcome));
    out.push_str(&format!(
        "- Builds: {} of {}\n",
        report.attempts.len(),
        report.max_retries
    ));
    if let Some(ms) = report.run.duration_ms {
        out.push_str(&format!("- Duration: {} ms\n", ms));
    }
    out.push('\n');

    out.push_str("## Attempts\n\n");
    if report.attempts.is_empty() {
        out.push_str("_No builds ran._\n");
    }
    for a in &report.attempts {
        if a.build_succeeded {
            out.push_str(&format!("### {}. build succeeded\n\n", a.attempt));
            continue;
        }
        out.push_str(&format!(
            "### {}. {} diagnostic(s) in {} file(s)\n\n",
            a.attempt, a.diagnostics_total, a.files_with_diagnostics
        ));
        if let Some(fp) = &a.fingerprint {
            out.push_str(&format!("- Fingerprint: `{}`\n", short(fp)));
        }
        for r in &a.repairs {
            out.push_str(&format!("- `{}` {}", r.path, r.status.as_str()));
            if let Some(msg) = &r.message {
                out.push_str(&format!(": {}", msg));
            }
            out.push('\n');
        }
        out.push('\n');
    }

    if let Some(diags) = &report.final_diagnostics
        && !diags.is_empty()
    {
        out.push_str("## Remaining diagnostics\n\n");
        for (path, list) in diags {
            out.push_str(&format!("**{}**\n\n", path));
            for d in list {
                out.push_str(&format!("- {}\n", d));
            }
            out.push('\n');
        }
    }

    if let Some(raw) = &report.raw_output {
        out.push_str("## Build output (tail)\n\n");
        out.push_str("No diagnostic matched the configured grammar.\n\n");
        let lines: Vec<&str> = raw.lines().collect();
        let tail = &lines[lines.len().saturating_sub(RAW_TAIL_LINES)..];
        out.push_str("```text\n");
        for line in tail {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("```\n");
    }

    out
}

pub fn render_translation_md(summary: &TranslationSummary) -> String {
    let mut out = String::new();
    out.push_str("# portfix migrate\n\n");
    out.push_str(&format!(
        "- Translated: {}\n- Missing source: {}\n- Oracle failed: {}\n- Write failed: {}\n\n",
        summary.translated(),
        summary.count(TranslationStatus::MissingSource),
        summary.count(TranslationStatus::OracleFailed),
        summary.count(TranslationStatus::WriteFailed),
    ));

    out.push_str("## Files\n\n");
    if summary.files.is_empty() {
        out.push_str("_No file mappings._\n");
        return out;
    }
    for f in &summary.files {
        out.push_str(&format!(
            "- `{}` → `{}` `{}`",
            f.source_file,
            f.target_path,
            status_label(f.status)
        ));
        if let Some(msg) = &f.message {
            out.push_str(&format!(": {}", msg));
        }
        out.push('\n');
    }
    out
}

fn status_label(s: TranslationStatus) -> &'static str {
    match s {
        TranslationStatus::Translated => "translated",
        TranslationStatus::MissingSource => "missing_source",
        TranslationStatus::OracleFailed => "oracle_failed",
        TranslationStatus::WriteFailed => "write_failed",
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}
