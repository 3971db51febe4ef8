use super::defaults::{default_kern_debug_dir, default_settings_path, MAX_RESULTS_CEILING};
use super::{AppConfig, Settings, SettingsFile};
use crate::menu::UPSTREAM_PAGE_CAP;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{
    env,
    path::{Path, PathBuf},
};

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize paths.
    pub fn validate(&mut self) -> Result<()> {
        if let Some(max_results) = self.max_results {
            if !(1..=MAX_RESULTS_CEILING).contains(&max_results) {
                bail!(
                    "--max-results must be between 1 and {MAX_RESULTS_CEILING}, got {max_results}"
                );
            }
        }
        if let Some(page_size) = self.page_size {
            if !(1..=UPSTREAM_PAGE_CAP).contains(&page_size) {
                bail!("--page-size must be between 1 and {UPSTREAM_PAGE_CAP}, got {page_size}");
            }
        }

        if let Some(fixture) = &mut self.fixture {
            if !fixture.is_file() {
                bail!("--fixture '{}' is not a readable file", fixture.display());
            }
            *fixture = fixture
                .canonicalize()
                .with_context(|| format!("failed to canonicalize --fixture '{}'", fixture.display()))?;
        }

        if let Some(dir) = &mut self.kern_debug_dir {
            *dir = absolutize(dir)?;
        }
        if let Some(path) = &mut self.config_path {
            *path = absolutize(path)?;
        }
        Ok(())
    }

    /// Merge CLI flags over the settings file. Flags win.
    pub fn resolve_settings(&self) -> Result<Settings> {
        let settings_path = self
            .config_path
            .clone()
            .unwrap_or_else(default_settings_path);
        let file = SettingsFile::load(&settings_path)?;
        if let Some(page_size) = file.page_size {
            if !(1..=UPSTREAM_PAGE_CAP).contains(&page_size) {
                bail!(
                    "page_size in '{}' must be between 1 and {UPSTREAM_PAGE_CAP}, got {page_size}",
                    settings_path.display()
                );
            }
        }
        if let Some(max_results) = file.max_results {
            if !(1..=MAX_RESULTS_CEILING).contains(&max_results) {
                bail!(
                    "max_results in '{}' must be between 1 and {MAX_RESULTS_CEILING}, got {max_results}",
                    settings_path.display()
                );
            }
        }

        let page_size = self
            .page_size
            .map(|_| self.effective_page_size())
            .or(file.page_size)
            .unwrap_or_else(|| self.effective_page_size());
        Ok(Settings {
            max_results: self.max_results.or(file.max_results),
            page_size,
            kern_debug_dir: self
                .kern_debug_dir
                .clone()
                .or(file.kern_debug_dir)
                .unwrap_or_else(default_kern_debug_dir),
            ponies: file.ponies.unwrap_or(false),
            settings_path,
        })
    }
}

/// Resolve a relative path against the working directory without requiring it to exist.
pub(super) fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        bail!("path arguments cannot be empty");
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().context("failed to resolve the working directory")?;
    Ok(cwd.join(path))
}
