//! Diagnostic extraction.
//!
//! portfix consumes whatever text the wrapped build tool prints. Parsing is tolerant: lines that do
//! not match the active grammar are log noise and are skipped. A failed build that yields zero
//! diagnostics is the caller's concern (it means the failure is outside the grammar).

mod extract;
mod grammar;

pub use extract::{escapes_root, extract, resolve_path};
pub use grammar::{BUILTIN_GRAMMARS, DiagnosticGrammar, GrammarError, RawDiagnostic};
