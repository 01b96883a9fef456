use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One structured build-tool complaint about a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "Line {}, column {}: {}", self.line, col, self.message),
            None => write!(f, "Line {}: {}", self.line, self.message),
        }
    }
}

/// Diagnostics of one build attempt, keyed by file path.
///
/// Keys are project-root-relative, or absolute when the build tool reported a
/// file outside the managed tree. Iteration is path-sorted; each file's list
/// keeps the order in which the build tool reported it.
///
/// A set is built fresh for every attempt and never merged with another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticSet {
    files: BTreeMap<Utf8PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: Utf8PathBuf, diagnostic: Diagnostic) {
        self.files.entry(path).or_default().push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of distinct files with at least one diagnostic.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of diagnostics across all files.
    pub fn total(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn get(&self, path: &Utf8Path) -> Option<&[Diagnostic]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Utf8PathBuf> {
        self.files.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utf8PathBuf, &[Diagnostic])> {
        self.files.iter().map(|(p, d)| (p, d.as_slice()))
    }
}

impl<'a> IntoIterator for &'a DiagnosticSet {
    type Item = (&'a Utf8PathBuf, &'a Vec<Diagnostic>);
    type IntoIter = std::collections::btree_map::Iter<'a, Utf8PathBuf, Vec<Diagnostic>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(line: u32, msg: &str) -> Diagnostic {
        Diagnostic {
            line,
            column: None,
            message: msg.to_string(),
        }
    }

    #[test]
    fn push_keeps_encounter_order_per_file() {
        let mut set = DiagnosticSet::new();
        set.push("b/B.java".into(), diag(9, "first"));
        set.push("a/A.java".into(), diag(3, "other"));
        set.push("b/B.java".into(), diag(2, "second"));

        let b = set.get(Utf8Path::new("b/B.java")).expect("b present");
        assert_eq!(b[0].message, "first");
        assert_eq!(b[1].message, "second");
        assert_eq!(set.file_count(), 2);
        assert_eq!(set.total(), 3);
    }

    #[test]
    fn iteration_is_path_sorted() {
        let mut set = DiagnosticSet::new();
        set.push("z.java".into(), diag(1, "z"));
        set.push("a.java".into(), diag(1, "a"));
        let paths: Vec<&str> = set.paths().map(|p| p.as_str()).collect();
        assert_eq!(paths, vec!["a.java", "z.java"]);
    }

    #[test]
    fn display_includes_column_when_known() {
        let d = Diagnostic {
            line: 18,
            column: Some(50),
            message: "<identifier> expected".to_string(),
        };
        assert_eq!(d.to_string(), "Line 18, column 50: <identifier> expected");
        assert_eq!(diag(4, "x").to_string(), "Line 4: x");
    }
}
