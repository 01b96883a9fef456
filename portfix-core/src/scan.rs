//! Source tree scanner.

use crate::settings::ScanSettings;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::Pattern;
use portfix_types::scan::{ScanResult, UNREADABLE_CONTENT};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Walks a source tree, skipping ignored paths, and reads the text of files
/// with configured extensions.
#[derive(Debug, Clone)]
pub struct FsScanner {
    root: Utf8PathBuf,
    dir_prefixes: Vec<String>,
    patterns: Vec<Pattern>,
    extensions: Vec<String>,
}

impl FsScanner {
    pub fn new(root: Utf8PathBuf, settings: &ScanSettings) -> anyhow::Result<Self> {
        let mut dir_prefixes = Vec::new();
        let mut patterns = Vec::new();
        for entry in &settings.ignore {
            if let Some(dir) = entry.strip_suffix('/') {
                dir_prefixes.push(dir.to_string());
            } else {
                patterns.push(
                    Pattern::new(entry)
                        .with_context(|| format!("invalid scan ignore pattern '{}'", entry))?,
                );
            }
        }
        Ok(Self {
            root,
            dir_prefixes,
            patterns,
            extensions: settings.extensions.clone(),
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn scan(&self) -> anyhow::Result<ScanResult> {
        if !self.root.is_dir() {
            anyhow::bail!("input directory {} does not exist", self.root);
        }

        let mut result = ScanResult {
            root_name: self
                .root
                .file_name()
                .unwrap_or(self.root.as_str())
                .to_string(),
            ..Default::default()
        };

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_ignored_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("skipping unreadable entry: {}", err);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = self.relative(entry.path()) else {
                debug!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            if self.is_ignored_file(&rel) {
                continue;
            }

            if self.wants_content(&rel) {
                let content = match fs::read_to_string(entry.path()) {
                    Ok(text) => text,
                    Err(err) => {
                        debug!(path = %rel, "unreadable source file: {}", err);
                        UNREADABLE_CONTENT.to_string()
                    }
                };
                result.contents.insert(rel.clone(), content);
            }
            result.files.push(rel);
        }

        result.files.sort();
        debug!(
            root = %self.root,
            files = result.files.len(),
            read = result.contents.len(),
            "scanned source tree"
        );
        Ok(result)
    }

    fn relative(&self, path: &std::path::Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let rel = Utf8Path::from_path(rel)?;
        Some(
            rel.components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let Some(rel) = self.relative(entry.path()) else {
            return false;
        };
        let name = entry.file_name().to_string_lossy();
        self.dir_prefixes
            .iter()
            .any(|d| d.as_str() == name || rel == *d || rel.starts_with(&format!("{d}/")))
    }

    fn is_ignored_file(&self, rel: &str) -> bool {
        let name = rel.rsplit('/').next().unwrap_or(rel);
        self.patterns
            .iter()
            .any(|p| p.matches(name) || p.matches(rel))
    }

    fn wants_content(&self, rel: &str) -> bool {
        self.extensions.iter().any(|ext| rel.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(root: &Utf8Path, rel: &str, contents: &[u8]) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write");
    }

    fn fixture() -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("WeatherApi")).expect("utf8");
        write(&root, "WeatherApi.csproj", b"<Project Sdk=\"Microsoft.NET.Sdk.Web\"/>");
        write(&root, "Program.cs", b"var app = WebApplication.Create();");
        write(&root, "Controllers/WeatherController.cs", b"class WeatherController {}");
        write(&root, "appsettings.json", b"{\"Logging\": {}}");
        write(&root, "web.config", b"<configuration/>");
        write(&root, "README.md", b"# Weather");
        write(&root, "bin/Debug/WeatherApi.dll", b"\x00\x01");
        write(&root, "obj/project.assets.json", b"{}");
        write(&root, ".git/HEAD", b"ref: refs/heads/main");
        write(&root, "tools/native.dll", b"\x00");
        write(&root, "Data/seed.json", b"\xff\xfe\x00");
        (temp, root)
    }

    #[test]
    fn scan_lists_files_and_reads_configured_extensions() {
        let (_temp, root) = fixture();
        let scanner = FsScanner::new(root, &ScanSettings::default()).expect("scanner");
        let scan = scanner.scan().expect("scan");

        assert_eq!(scan.root_name, "WeatherApi");
        assert_eq!(
            scan.files,
            vec![
                "Controllers/WeatherController.cs",
                "Data/seed.json",
                "Program.cs",
                "README.md",
                "WeatherApi.csproj",
                "appsettings.json",
                "web.config",
            ]
        );
        assert_eq!(
            scan.content_of("Program.cs"),
            Some("var app = WebApplication.Create();")
        );
        assert!(scan.contents.contains_key("web.config"));
        assert!(!scan.contents.contains_key("README.md"));
    }

    #[test]
    fn undecodable_file_is_marked_unreadable() {
        let (_temp, root) = fixture();
        let scan = FsScanner::new(root, &ScanSettings::default())
            .expect("scanner")
            .scan()
            .expect("scan");
        assert_eq!(
            scan.contents.get("Data/seed.json").map(String::as_str),
            Some(UNREADABLE_CONTENT)
        );
        assert_eq!(scan.content_of("Data/seed.json"), None);
    }

    #[test]
    fn custom_ignore_list_replaces_defaults() {
        let (_temp, root) = fixture();
        let settings = ScanSettings {
            ignore: vec!["Controllers/".to_string(), "*.json".to_string()],
            extensions: vec![".cs".to_string()],
        };
        let scan = FsScanner::new(root, &settings)
            .expect("scanner")
            .scan()
            .expect("scan");
        assert!(scan.files.iter().all(|f| !f.starts_with("Controllers/")));
        assert!(scan.files.iter().all(|f| !f.ends_with(".json")));
        assert!(scan.files.iter().any(|f| f.starts_with("bin/")));
        assert_eq!(scan.contents.keys().collect::<Vec<_>>(), vec!["Program.cs"]);
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let settings = ScanSettings {
            ignore: vec!["[".to_string()],
            ..ScanSettings::default()
        };
        assert!(FsScanner::new(Utf8PathBuf::from("."), &settings).is_err());
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().join("absent")).expect("utf8");
        let scanner = FsScanner::new(root, &ScanSettings::default()).expect("scanner");
        assert!(scanner.scan().is_err());
    }
}
