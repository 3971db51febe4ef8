use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::{default_kern_debug_dir, DEFAULT_PAGE_SIZE, MAX_RESULTS_CEILING};
use crate::menu::{PageLimits, UPSTREAM_PAGE_CAP};

/// Option names understood by the settings file, with their help text.
pub const SETTINGS_OPTIONS: &[(&str, &str)] = &[
    (
        "max_results",
        "Maximum number of results fetched for one listing. Default=1500 for cases, 500 for searches",
    ),
    (
        "page_size",
        "Results requested per round trip, between 1 and 50. Default=50",
    ),
    (
        "kern_debug_dir",
        "Directory holding extracted kernel debug images. Default=/var/lib/support-tool/debugkernels",
    ),
    (
        "ponies",
        "Show the moderation state of solutions in search results (true/false). Default=false",
    ),
];

/// Options persisted in the YAML settings file. Every field is optional so a partial
/// file only overrides what it names.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kern_debug_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ponies: Option<bool>,
}

impl SettingsFile {
    /// Load the settings file; a missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_yaml::to_string(self).context("failed to serialize settings")?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create settings directory '{}'", parent.display())
                })?;
            }
        }
        fs::write(path, raw)
            .with_context(|| format!("failed to write settings file '{}'", path.display()))
    }

    /// Current value of a named option, if set.
    pub fn get(&self, name: &str) -> Result<Option<String>> {
        let value = match name {
            "max_results" => self.max_results.map(|v| v.to_string()),
            "page_size" => self.page_size.map(|v| v.to_string()),
            "kern_debug_dir" => self
                .kern_debug_dir
                .as_ref()
                .map(|p| p.display().to_string()),
            "ponies" => self.ponies.map(|v| v.to_string()),
            _ => bail!("unknown option '{name}'"),
        };
        Ok(value)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match name {
            "max_results" => self.max_results = Some(parse_max_results(value)?),
            "page_size" => self.page_size = Some(parse_page_size(value)?),
            "kern_debug_dir" => {
                if value.is_empty() {
                    bail!("kern_debug_dir cannot be empty");
                }
                self.kern_debug_dir = Some(PathBuf::from(value));
            }
            "ponies" => {
                self.ponies = Some(
                    str_to_bool(value)
                        .with_context(|| format!("ponies expects true or false, got '{value}'"))?,
                )
            }
            _ => bail!("unknown option '{name}'"),
        }
        Ok(())
    }

    pub fn unset(&mut self, name: &str) -> Result<()> {
        match name {
            "max_results" => self.max_results = None,
            "page_size" => self.page_size = None,
            "kern_debug_dir" => self.kern_debug_dir = None,
            "ponies" => self.ponies = None,
            _ => bail!("unknown option '{name}'"),
        }
        Ok(())
    }
}

/// Resolved, read-only settings shared by every command for the life of the process.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Explicit offset ceiling; `None` lets each listing use its own default.
    pub max_results: Option<usize>,
    pub page_size: usize,
    pub kern_debug_dir: PathBuf,
    pub ponies: bool,
    /// Where `config` persists changes.
    pub settings_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: None,
            page_size: DEFAULT_PAGE_SIZE,
            kern_debug_dir: default_kern_debug_dir(),
            ponies: false,
            settings_path: super::defaults::default_settings_path(),
        }
    }
}

impl Settings {
    /// Paging limits for a listing whose unconfigured ceiling is `default_max`.
    pub fn page_limits(&self, default_max: usize) -> PageLimits {
        PageLimits::new(self.max_results.unwrap_or(default_max), self.page_size)
    }
}

pub(super) fn parse_max_results(value: &str) -> Result<usize> {
    let parsed: usize = value
        .parse()
        .with_context(|| format!("max_results must be a number, got '{value}'"))?;
    if !(1..=MAX_RESULTS_CEILING).contains(&parsed) {
        bail!("max_results must be between 1 and {MAX_RESULTS_CEILING}, got {parsed}");
    }
    Ok(parsed)
}

pub(super) fn parse_page_size(value: &str) -> Result<usize> {
    let parsed: usize = value
        .parse()
        .with_context(|| format!("page_size must be a number, got '{value}'"))?;
    if !(1..=UPSTREAM_PAGE_CAP).contains(&parsed) {
        bail!("page_size must be between 1 and {UPSTREAM_PAGE_CAP}, got {parsed}");
    }
    Ok(parsed)
}

fn str_to_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "false" | "f" | "no" | "n" | "0" => Some(false),
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        _ => None,
    }
}
