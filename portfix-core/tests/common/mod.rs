#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use portfix_core::ports::{
    BuildInvoker, BuildOutput, ContentProvider, Oracle, OracleError, RepoView, WritePort,
};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

pub const ROOT: &str = "/proj";

pub fn maven_error(rel: &str, line: u32, col: u32, msg: &str) -> String {
    format!("[ERROR] {ROOT}/{rel}:[{line},{col}] {msg}")
}

pub fn failed(lines: &[String]) -> BuildOutput {
    BuildOutput {
        success: false,
        output: format!("[INFO] Compiling\n{}\n[INFO] BUILD FAILURE\n", lines.join("\n")),
    }
}

pub fn passed() -> BuildOutput {
    BuildOutput {
        success: true,
        output: "[INFO] BUILD SUCCESS\n".to_string(),
    }
}

/// Replays build results in order; the last one repeats forever.
pub struct ScriptedBuild {
    script: Mutex<VecDeque<BuildOutput>>,
    calls: Mutex<u32>,
}

impl ScriptedBuild {
    pub fn new(script: Vec<BuildOutput>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        *self.calls.lock().expect("lock")
    }
}

impl BuildInvoker for ScriptedBuild {
    fn run(&self) -> anyhow::Result<BuildOutput> {
        *self.calls.lock().expect("lock") += 1;
        let mut script = self.script.lock().expect("lock");
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.ok_or_else(|| anyhow::anyhow!("empty build script"))
    }
}

type Responder = Box<dyn Fn(&str) -> Result<String, OracleError> + Send + Sync>;

/// Deterministic oracle: a pure function of the prompt.
pub struct StubOracle {
    respond: Responder,
    prompts: Mutex<Vec<String>>,
}

impl StubOracle {
    pub fn new(respond: impl Fn(&str) -> Result<String, OracleError> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("lock").len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

impl Oracle for StubOracle {
    fn generate(&self, prompt: &str, _system_instruction: &str) -> Result<String, OracleError> {
        self.prompts.lock().expect("lock").push(prompt.to_string());
        (self.respond)(prompt)
    }
}

/// In-memory project tree rooted at [`ROOT`].
pub struct MemRepo {
    root: Utf8PathBuf,
    files: HashMap<Utf8PathBuf, String>,
}

impl MemRepo {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            root: Utf8PathBuf::from(ROOT),
            files: files
                .iter()
                .map(|(p, c)| (Utf8PathBuf::from(*p), c.to_string()))
                .collect(),
        }
    }
}

impl RepoView for MemRepo {
    fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_to_string(&self, rel: &Utf8Path) -> anyhow::Result<String> {
        self.files
            .get(rel)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("not found: {rel}"))
    }

    fn exists(&self, rel: &Utf8Path) -> bool {
        self.files.contains_key(rel)
    }
}

#[derive(Default)]
pub struct MemWritePort {
    files: Mutex<BTreeMap<Utf8PathBuf, Vec<u8>>>,
    dirs: Mutex<Vec<Utf8PathBuf>>,
}

impl MemWritePort {
    pub fn written(&self) -> BTreeMap<Utf8PathBuf, String> {
        self.files
            .lock()
            .expect("lock")
            .iter()
            .map(|(p, b)| (p.clone(), String::from_utf8_lossy(b).into_owned()))
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.written().get(Utf8Path::new(path)).cloned()
    }

    pub fn dirs(&self) -> Vec<Utf8PathBuf> {
        self.dirs.lock().expect("lock").clone()
    }
}

impl WritePort for MemWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        self.dirs.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
}

/// A write port that refuses one path.
pub struct FailingWritePort {
    pub inner: MemWritePort,
    pub refuse: Utf8PathBuf,
}

impl WritePort for FailingWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if path == self.refuse.as_path() {
            anyhow::bail!("permission denied");
        }
        self.inner.write_file(path, contents)
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        self.inner.create_dir_all(path)
    }
}

/// Content provider backed by a map.
pub struct MapContent(pub HashMap<String, String>);

impl ContentProvider for MapContent {
    fn content_of(&self, rel: &str) -> Option<String> {
        self.0.get(rel).filter(|c| !c.trim().is_empty()).cloned()
    }
}
