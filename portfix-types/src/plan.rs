use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root aggregate of one migration run.
///
/// Constructed once from the oracle's plan proposal and validated by
/// `portfix_domain::validate_plan`. Treated as read-only afterwards; a new
/// migration produces a new plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub project_name: String,

    #[serde(default = "default_group_id")]
    pub group_id: String,

    #[serde(default = "default_artifact_id")]
    pub artifact_id: String,

    #[serde(default = "default_java_version")]
    pub java_version: String,

    #[serde(default = "default_spring_boot_version")]
    pub spring_boot_version: String,

    pub dependencies: Vec<DependencySpec>,

    pub file_mappings: Vec<FileMapping>,

    /// Key/value pairs for `application.properties`. Order is irrelevant;
    /// a sorted map keeps rendering deterministic.
    pub application_properties: BTreeMap<String, String>,
}

impl MigrationPlan {
    /// Artifact ids of the declared dependencies, in plan order.
    pub fn dependency_artifact_ids(&self) -> Vec<&str> {
        self.dependencies
            .iter()
            .map(|d| d.artifact_id.as_str())
            .collect()
    }

    pub fn mapping_for_source(&self, source_file: &str) -> Option<&FileMapping> {
        self.file_mappings
            .iter()
            .find(|m| m.source_file == source_file)
    }
}

/// On-disk form of a plan saved by `migrate` (`.portfix/plan.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub schema: String,
    pub plan: MigrationPlan,
}

impl SavedPlan {
    pub fn new(plan: MigrationPlan) -> Self {
        Self {
            schema: crate::schema::PORTFIX_PLAN_V1.to_string(),
            plan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub group_id: String,
    pub artifact_id: String,

    /// `None` means "resolve via the parent bill of materials".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default = "default_scope")]
    pub scope: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    /// Path of the source file, relative to the scanned root.
    pub source_file: String,

    /// Path of the generated file, relative to the output root.
    pub target_path: String,

    pub package_name: String,
}

pub fn default_group_id() -> String {
    "com.example".to_string()
}

pub fn default_artifact_id() -> String {
    "demo".to_string()
}

pub fn default_java_version() -> String {
    "17".to_string()
}

pub fn default_spring_boot_version() -> String {
    "3.2.0".to_string()
}

pub fn default_scope() -> String {
    "compile".to_string()
}
