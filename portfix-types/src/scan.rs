use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placeholder stored for files that matched an extension but could not be read as text.
pub const UNREADABLE_CONTENT: &str = "<BINARY_OR_UNREADABLE>";

/// Snapshot of a source tree: every non-ignored path plus the text of the
/// files the planner and translator care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub root_name: String,

    /// Root-relative, `/`-separated, sorted.
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub contents: BTreeMap<String, String>,
}

impl ScanResult {
    /// Readable content of `rel`; `None` when absent, blank or unreadable.
    pub fn content_of(&self, rel: &str) -> Option<&str> {
        self.contents
            .get(rel)
            .map(String::as_str)
            .filter(|c| !c.trim().is_empty() && *c != UNREADABLE_CONTENT)
    }
}
