use serde::{Deserialize, Serialize};

/// Outcome of translating the files of one plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationSummary {
    #[serde(default)]
    pub files: Vec<FileTranslation>,
}

impl TranslationSummary {
    pub fn count(&self, status: TranslationStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }

    pub fn translated(&self) -> usize {
        self.count(TranslationStatus::Translated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTranslation {
    pub source_file: String,
    pub target_path: String,
    pub status: TranslationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Translated,
    MissingSource,
    OracleFailed,
    WriteFailed,
}
