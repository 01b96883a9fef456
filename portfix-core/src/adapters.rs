//! Default filesystem- and process-backed port implementations.

use crate::ports::{BuildInvoker, BuildOutput, ContentProvider, RepoView, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use portfix_types::scan::ScanResult;
use std::process::Command;
use tracing::debug;

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

/// File-system backed `RepoView`.
#[derive(Debug, Clone)]
pub struct FsRepoView {
    root: Utf8PathBuf,
}

impl FsRepoView {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    fn abs(&self, rel: &Utf8Path) -> Utf8PathBuf {
        if rel.is_absolute() {
            rel.to_path_buf()
        } else {
            self.root.join(rel)
        }
    }
}

impl RepoView for FsRepoView {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        let abs = self.abs(rel);
        fs::read_to_string(&abs).with_context(|| format!("read {}", abs))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.abs(rel).is_file()
    }
}

/// A scan snapshot serves as the content provider for translation.
impl ContentProvider for ScanResult {
    fn content_of(&self, rel: &str) -> Option<String> {
        ScanResult::content_of(self, rel).map(str::to_string)
    }
}

/// Runs a build command in the project directory.
///
/// A command that cannot be spawned counts as a failed build whose output
/// is the spawn error, so the loop reports it as an unparseable failure.
#[derive(Debug, Clone)]
pub struct CommandBuildInvoker {
    program: String,
    args: Vec<String>,
    dir: Utf8PathBuf,
}

impl CommandBuildInvoker {
    pub fn new(command: &[String], dir: Utf8PathBuf) -> anyhow::Result<Self> {
        let (program, args) = command
            .split_first()
            .context("build command must not be empty")?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            dir,
        })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BuildInvoker for CommandBuildInvoker {
    fn run(&self) -> anyhow::Result<BuildOutput> {
        debug!(command = %self.command_line(), dir = %self.dir, "running build");
        let out = match Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.dir)
            .output()
        {
            Ok(out) => out,
            Err(e) => {
                return Ok(BuildOutput {
                    success: false,
                    output: format!("failed to run `{}`: {}", self.command_line(), e),
                });
            }
        };

        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        output.push('\n');
        output.push_str(&String::from_utf8_lossy(&out.stderr));

        debug!(status = ?out.status.code(), bytes = output.len(), "build finished");
        Ok(BuildOutput {
            success: out.status.success(),
            output,
        })
    }
}
