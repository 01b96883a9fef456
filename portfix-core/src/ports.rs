//! Port traits abstracting all I/O away from the pipelines.

use camino::Utf8Path;
use thiserror::Error;

/// Result of one build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Exit status zero.
    pub success: bool,
    /// Standard output and standard error, merged.
    pub output: String,
}

/// Runs the external build over the whole project tree.
pub trait BuildInvoker {
    fn run(&self) -> anyhow::Result<BuildOutput>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("oracle request timed out")]
    Timeout,

    #[error("oracle quota exhausted: {0}")]
    Quota(String),

    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("oracle returned an empty response")]
    EmptyResponse,

    #[error("oracle response could not be decoded: {0}")]
    Malformed(String),
}

/// The generative model. Output is untrusted and may differ between calls.
pub trait Oracle {
    fn generate(&self, prompt: &str, system_instruction: &str) -> Result<String, OracleError>;
}

/// Source file contents keyed by scan-relative path.
pub trait ContentProvider {
    /// `None` when the file is unknown, blank or unreadable.
    fn content_of(&self, rel: &str) -> Option<String>;
}

/// File-system write operations.
pub trait WritePort {
    /// Write `contents` to `path`, creating parent directories.
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

/// Read-only access to the project under repair.
pub trait RepoView {
    fn root(&self) -> &Utf8Path;

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String>;

    fn exists(&self, rel: &Utf8Path) -> bool;
}
