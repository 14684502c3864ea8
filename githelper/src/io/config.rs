//! Helper configuration stored under `<config dir>/git-helper/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::io::history::HISTORY_LIMIT;

/// Helper configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// below, so an absent file behaves exactly like a fresh install.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HelperConfig {
    /// Executable invoked for every git operation.
    pub git_program: String,

    /// Journal location. Defaults to `~/.git_helper_history.json`.
    pub history_file: Option<PathBuf>,

    /// Number of records kept in the journal, at most `HISTORY_LIMIT`.
    pub history_limit: usize,

    /// Lines written to `.gitignore` by `init`.
    pub ignore_entries: Vec<String>,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            history_file: None,
            history_limit: HISTORY_LIMIT,
            ignore_entries: vec!["node_modules".to_string(), ".env".to_string()],
        }
    }
}

impl HelperConfig {
    pub fn validate(&self) -> Result<()> {
        if self.git_program.trim().is_empty() {
            return Err(anyhow!("git_program must be non-empty"));
        }
        if self.history_limit == 0 || self.history_limit > HISTORY_LIMIT {
            return Err(anyhow!("history_limit must be between 1 and {HISTORY_LIMIT}"));
        }
        if self.ignore_entries.is_empty() {
            return Err(anyhow!("ignore_entries must be a non-empty array"));
        }
        Ok(())
    }

    /// Contents of the `.gitignore` written by `init`.
    pub fn ignore_file_contents(&self) -> String {
        let mut contents = self.ignore_entries.join("\n");
        contents.push('\n');
        contents
    }
}

/// Default config location, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-helper").join("config.toml"))
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `HelperConfig::default()`.
pub fn load_config(path: &Path) -> Result<HelperConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = HelperConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HelperConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Load config, falling back to defaults on any problem.
///
/// A broken config file must not block git operations, so errors are logged
/// and swallowed here.
pub fn load_config_or_default(path: Option<&Path>) -> HelperConfig {
    let Some(path) = path else {
        debug!("no config directory, using defaults");
        return HelperConfig::default();
    };
    match load_config(path) {
        Ok(cfg) => cfg,
        Err(err) => {
            warn!(err = %format!("{err:#}"), "ignoring invalid config");
            HelperConfig::default()
        }
    }
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &HelperConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
