//! Clap-free settings for the pipelines.

use camino::Utf8PathBuf;
use portfix_diagnostics::DiagnosticGrammar;
use portfix_domain::LanguagePair;
use std::time::Duration;

/// Settings for the repair loop.
#[derive(Debug, Clone)]
pub struct HealSettings {
    pub project_root: Utf8PathBuf,

    /// Upper bound on build attempts.
    pub max_retries: u32,

    /// End the loop as `Stalled` when an attempt reproduces the previous
    /// attempt's diagnostics exactly.
    pub halt_on_stall: bool,

    pub grammar: DiagnosticGrammar,
    pub languages: LanguagePair,
}

impl Default for HealSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            max_retries: 3,
            halt_on_stall: false,
            grammar: DiagnosticGrammar::default(),
            languages: LanguagePair::default(),
        }
    }
}

/// Settings for the translation orchestrator.
#[derive(Debug, Clone)]
pub struct TranslateSettings {
    pub output_root: Utf8PathBuf,
    pub languages: LanguagePair,
}

impl Default for TranslateSettings {
    fn default() -> Self {
        Self {
            output_root: Utf8PathBuf::from("."),
            languages: LanguagePair::default(),
        }
    }
}

/// Settings for the source tree scanner.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Directory prefixes (`bin/`) and glob patterns (`*.dll`) to skip.
    pub ignore: Vec<String>,

    /// File suffixes whose content is read; `config` matches `web.config`.
    pub extensions: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            ignore: [
                "bin/",
                "obj/",
                ".git/",
                ".idea/",
                ".vscode/",
                "__pycache__/",
                "*.exe",
                "*.dll",
                "*.pdb",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            extensions: [".cs", ".csproj", ".json", ".xml", "config"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings for the HTTP oracle.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(120),
        }
    }
}
