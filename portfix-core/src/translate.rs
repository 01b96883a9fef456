//! Translation orchestrator.

use crate::cancel::CancellationToken;
use crate::ports::{ContentProvider, Oracle, WritePort};
use crate::settings::TranslateSettings;
use portfix_domain::{contained_target, strip_fence, translation_request};
use portfix_types::plan::{FileMapping, MigrationPlan};
use portfix_types::translate::{FileTranslation, TranslationStatus, TranslationSummary};
use tracing::{info, warn};

/// Translate every mapping in plan order.
///
/// Each mapping succeeds or fails on its own; missing source content, oracle
/// failures and write failures are recorded in the summary and the next
/// mapping is processed. When `cancel` fires, the remaining mappings are
/// not started.
pub fn translate_all(
    plan: &MigrationPlan,
    content: &dyn ContentProvider,
    oracle: &dyn Oracle,
    writer: &dyn WritePort,
    settings: &TranslateSettings,
    cancel: &CancellationToken,
) -> TranslationSummary {
    let mut summary = TranslationSummary::default();
    let total = plan.file_mappings.len();

    for (i, mapping) in plan.file_mappings.iter().enumerate() {
        if cancel.is_cancelled() {
            warn!(remaining = total - i, "translation cancelled");
            break;
        }
        info!(
            index = i + 1,
            total,
            source = %mapping.source_file,
            "translating"
        );
        summary
            .files
            .push(translate_one(plan, mapping, content, oracle, writer, settings));
    }

    info!(
        translated = summary.translated(),
        total, "translation finished"
    );
    summary
}

fn translate_one(
    plan: &MigrationPlan,
    mapping: &FileMapping,
    content: &dyn ContentProvider,
    oracle: &dyn Oracle,
    writer: &dyn WritePort,
    settings: &TranslateSettings,
) -> FileTranslation {
    let record = |status, message: Option<String>| FileTranslation {
        source_file: mapping.source_file.clone(),
        target_path: mapping.target_path.clone(),
        status,
        message,
    };

    let Some(source) = content.content_of(&mapping.source_file) else {
        warn!(source = %mapping.source_file, "source content missing; skipping");
        return record(
            TranslationStatus::MissingSource,
            Some("source content missing or empty".to_string()),
        );
    };

    let Some(rel) = contained_target(&mapping.target_path) else {
        warn!(target = %mapping.target_path, "target path leaves the output root");
        return record(
            TranslationStatus::WriteFailed,
            Some(format!("{} is outside the output root", mapping.target_path)),
        );
    };
    let target = settings.output_root.join(rel);

    let req = translation_request(&source, mapping, plan, &settings.languages);
    let response = match oracle.generate(&req.prompt, &req.system_instruction) {
        Ok(r) => r,
        Err(err) => {
            warn!(source = %mapping.source_file, "translation failed: {}", err);
            return record(TranslationStatus::OracleFailed, Some(err.to_string()));
        }
    };

    let code = strip_fence(&response);
    if let Err(err) = writer.write_file(&target, code.as_bytes()) {
        warn!(target = %target, "write failed: {:#}", err);
        return record(TranslationStatus::WriteFailed, Some(format!("{:#}", err)));
    }

    record(TranslationStatus::Translated, None)
}
