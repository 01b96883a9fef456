use crate::grammar::DiagnosticGrammar;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use portfix_types::diagnostic::{Diagnostic, DiagnosticSet};
use tracing::debug;

/// Parse raw build output into a [`DiagnosticSet`].
///
/// Paths under `project_root` are stored root-relative; relative paths are
/// taken as already root-relative; anything else is kept verbatim.
pub fn extract(
    build_output: &str,
    project_root: &Utf8Path,
    grammar: &DiagnosticGrammar,
) -> DiagnosticSet {
    let mut set = DiagnosticSet::new();
    let mut matched = 0usize;

    for line in build_output.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(raw) = grammar.parse_line(line) else {
            continue;
        };
        matched += 1;
        set.push(
            resolve_path(raw.path, project_root),
            Diagnostic {
                line: raw.line,
                column: raw.column,
                message: raw.message.to_string(),
            },
        );
    }

    debug!(
        grammar = grammar.name(),
        matched,
        files = set.file_count(),
        "extracted diagnostics"
    );
    set
}

/// Map a path reported by the build tool onto a diagnostic key.
///
/// `.` and `..` are resolved lexically first. A path that lands inside the
/// root becomes root-relative; one that climbs out of it is anchored at the
/// root and kept whole, so it never reads as a project file.
pub fn resolve_path(reported: &str, project_root: &Utf8Path) -> Utf8PathBuf {
    let path = normalize(Utf8Path::new(reported));
    let root = normalize(project_root);

    if path.is_absolute() {
        return match path.strip_prefix(&root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path,
        };
    }

    if escapes_root(&path) {
        return normalize(&root.join(&path));
    }
    path
}

/// True when a relative path starts above its base directory.
pub fn escapes_root(path: &Utf8Path) -> bool {
    matches!(path.components().next(), Some(Utf8Component::ParentDir))
}

/// Lexical `.`/`..` resolution; the filesystem is never consulted.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`.
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_str()).collect()
}
