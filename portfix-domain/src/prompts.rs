//! Oracle request builders.
//!
//! The oracle is opaque; these functions only decide what text it sees.

use crate::fence::wrap_fence;
use portfix_types::diagnostic::Diagnostic;
use portfix_types::plan::{FileMapping, MigrationPlan};
use portfix_types::scan::ScanResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One prompt plus the system instruction it is sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub prompt: String,
    pub system_instruction: String,
}

/// Human-readable names of the source and target platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: "C#/.NET Core".to_string(),
            target: "Java".to_string(),
        }
    }
}

impl LanguagePair {
    /// Info string used when fencing target-language code, e.g. `java`.
    pub fn target_fence_tag(&self) -> String {
        self.target
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_lowercase()
    }
}

/// Files that decide dependencies and configuration.
fn is_planning_input(path: &str) -> bool {
    path.ends_with(".csproj")
        || path.ends_with("Program.cs")
        || path.ends_with("Startup.cs")
        || path.ends_with("appsettings.json")
}

/// Ask for a complete migration plan as JSON.
pub fn plan_request(scan: &ScanResult, langs: &LanguagePair) -> OracleRequest {
    let inputs: BTreeMap<&str, &str> = scan
        .contents
        .iter()
        .filter(|(path, _)| is_planning_input(path))
        .map(|(path, content)| (path.as_str(), content.as_str()))
        .collect();

    let inputs_json = serde_json::to_string_pretty(&inputs).unwrap_or_default();
    let files_json = serde_json::to_string_pretty(&scan.files).unwrap_or_default();

    let prompt = format!(
        r#"Analyze this {source} project and create a precise migration plan to a Spring Boot {target} application.

Input Files:
{inputs_json}

All File Paths:
{files_json}

Goal:
1. Identify equivalent Maven dependencies for the source project's packages.
2. Map every source file to a corresponding {target} path following the standard Maven layout (src/main/java/com/example/...).
3. Extract configuration into application.properties key/value pairs.

Output:
Return ONLY valid JSON that matches the following schema:
{{
    "project_name": "...",
    "group_id": "com.example",
    "artifact_id": "migrated-app",
    "java_version": "17",
    "spring_boot_version": "3.2.0",
    "dependencies": [
        {{"group_id": "...", "artifact_id": "...", "version": "..."}}
    ],
    "file_mappings": [
        {{"source_file": "...", "target_path": "...", "package_name": "..."}}
    ],
    "application_properties": {{ "key": "value" }}
}}
Every source_file must appear at most once and every target_path must be unique.
"#,
        source = langs.source,
        target = langs.target,
    );

    OracleRequest {
        prompt,
        system_instruction: format!(
            "You are a Senior Architect specializing in {} to {} migrations. You output strictly JSON.",
            langs.source, langs.target
        ),
    }
}

/// Ask for the target-language equivalent of one source file.
pub fn translation_request(
    source_code: &str,
    mapping: &FileMapping,
    plan: &MigrationPlan,
    langs: &LanguagePair,
) -> OracleRequest {
    let prompt = format!(
        r#"Translate the following {source} code to a SINGLE {target} class (Spring Boot/Lombok).

Target Context:
- Package Name: {package}
- Target Path: {target_path}
- Spring Boot Version: {boot}
- Java Version: {java}
- Dependencies available: [{deps}]

CRITICAL RULES:
1. Output ONLY the {target} code for the one class corresponding to the input file.
2. Do NOT include any other classes in the same response.
3. Do NOT include markdown formatting or comments like '// Path: ...'.
4. Ensure the package declaration matches `{package}`.
5. Use Lombok @Data for models, @RestController for controllers.

Source Code ({source_file}):
{code}
"#,
        source = langs.source,
        target = langs.target,
        package = mapping.package_name,
        target_path = mapping.target_path,
        boot = plan.spring_boot_version,
        java = plan.java_version,
        deps = plan.dependency_artifact_ids().join(", "),
        source_file = mapping.source_file,
        code = source_code,
    );

    OracleRequest {
        prompt,
        system_instruction: format!(
            "You are an expert {} developer. Output strictly valid {} code.",
            langs.target, langs.target
        ),
    }
}

/// Ask for a complete, compiling replacement of one file.
///
/// One line per diagnostic, in the order the build tool reported them.
pub fn repair_request(
    path: &str,
    diagnostics: &[Diagnostic],
    code: &str,
    langs: &LanguagePair,
) -> OracleRequest {
    let errors = diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    let fenced = wrap_fence(code, &langs.target_fence_tag());

    let prompt = format!(
        r#"The following {target} code failed to compile.

File: {path}

Errors:
{errors}

Code:
{fenced}

Task:
Fix the compilation errors. Retain the logic.
Output ONLY the fixed {target} code (complete file).
"#,
        target = langs.target,
    );

    OracleRequest {
        prompt,
        system_instruction: format!(
            "You are an expert {} debugger. You fix compilation errors accurately.",
            langs.target
        ),
    }
}
