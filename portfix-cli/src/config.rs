//! Configuration file loading for portfix.
//!
//! Discovers and loads `portfix.toml` from the working directory (or an
//! explicit `--config` path). Merges config file settings with CLI
//! arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use portfix_core::settings::{HealSettings, OracleSettings, ScanSettings};
use portfix_diagnostics::DiagnosticGrammar;
use portfix_domain::LanguagePair;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "portfix.toml";

/// Top-level configuration from portfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortfixConfig {
    pub oracle: OracleConfig,
    pub build: BuildConfig,
    pub repair: RepairConfig,
    pub scan: ScanConfig,
    pub languages: LanguagePair,
}

/// Oracle section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OracleConfig {
    pub model: String,
    pub endpoint: String,

    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    pub api_key_env: String,

    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        let defaults = OracleSettings::default();
        Self {
            model: defaults.model,
            endpoint: defaults.endpoint,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

/// Build section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Program and arguments, run in the project directory.
    pub command: Vec<String>,

    /// Name of a built-in diagnostic grammar.
    pub grammar: String,

    /// Custom diagnostic regex; overrides `grammar`.
    pub pattern: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: ["mvn", "clean", "install", "-e", "-B"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            grammar: "maven".to_string(),
            pattern: None,
        }
    }
}

/// Repair section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepairConfig {
    pub max_retries: u32,
    pub halt_on_stall: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        let defaults = HealSettings::default();
        Self {
            max_retries: defaults.max_retries,
            halt_on_stall: defaults.halt_on_stall,
        }
    }
}

/// Scan section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub ignore: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let defaults = ScanSettings::default();
        Self {
            ignore: defaults.ignore,
            extensions: defaults.extensions,
        }
    }
}

/// Discover the portfix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a portfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PortfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<PortfixConfig> {
    let config: PortfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicit config, else the one discovered in `dir`, else defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<PortfixConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(PortfixConfig::default()),
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PortfixConfig,
}

impl ConfigMerger {
    pub fn new(config: PortfixConfig) -> Self {
        Self { config }
    }

    pub fn languages(&self) -> LanguagePair {
        self.config.languages.clone()
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            ignore: self.config.scan.ignore.clone(),
            extensions: self.config.scan.extensions.clone(),
        }
    }

    pub fn build_command(&self) -> &[String] {
        &self.config.build.command
    }

    /// Oracle settings with the CLI `--model` applied and the API key read
    /// through `lookup` (the process environment in production).
    pub fn merge_oracle_args(
        &self,
        cli_model: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<OracleSettings> {
        let cfg = &self.config.oracle;
        let api_key = lookup(&cfg.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .with_context(|| {
                format!(
                    "oracle API key not set; export {} or change [oracle].api_key_env",
                    cfg.api_key_env
                )
            })?;
        Ok(OracleSettings {
            model: cli_model.map_or_else(|| cfg.model.clone(), str::to_string),
            endpoint: cfg.endpoint.clone(),
            api_key,
            timeout: Duration::from_secs(cfg.timeout_secs),
        })
    }

    /// Repair-loop settings. CLI `--retries` replaces the config value;
    /// `--halt-on-stall` can only switch halting on.
    pub fn merge_heal_args(
        &self,
        project_root: Utf8PathBuf,
        cli_retries: Option<u32>,
        cli_halt_on_stall: bool,
    ) -> anyhow::Result<HealSettings> {
        let max_retries = cli_retries.unwrap_or(self.config.repair.max_retries);
        if max_retries == 0 {
            anyhow::bail!("max_retries must be at least 1");
        }
        Ok(HealSettings {
            project_root,
            max_retries,
            halt_on_stall: cli_halt_on_stall || self.config.repair.halt_on_stall,
            grammar: self.grammar()?,
            languages: self.languages(),
        })
    }

    fn grammar(&self) -> anyhow::Result<DiagnosticGrammar> {
        let build = &self.config.build;
        let grammar = match &build.pattern {
            Some(pattern) => DiagnosticGrammar::new("custom", pattern),
            None => DiagnosticGrammar::builtin(&build.grammar),
        };
        grammar.context("invalid [build] diagnostic grammar")
    }
}
