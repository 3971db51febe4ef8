//! Command-line parsing, settings file, and validation helpers.

mod defaults;
mod settings;
mod validation;

use clap::Parser;
use std::path::PathBuf;

pub use defaults::{
    default_kern_debug_dir, default_settings_path, DEFAULT_CASE_MAX_RESULTS, DEFAULT_PAGE_SIZE,
    DEFAULT_SEARCH_MAX_RESULTS, MAX_RESULTS_CEILING,
};
pub use settings::{Settings, SettingsFile, SETTINGS_OPTIONS};

use crate::menu::UPSTREAM_PAGE_CAP;

/// Global CLI options for the support shell. Validated values are merged with the
/// settings file into a read-only [`Settings`] snapshot at startup.
#[derive(Debug, Parser, Clone)]
#[command(about = "Support Tool", author, version)]
pub struct AppConfig {
    /// JSON snapshot used as the offline ticketing service
    #[arg(long, env = "SUPPORT_TOOL_FIXTURE", value_name = "PATH")]
    pub fixture: Option<PathBuf>,

    /// YAML settings file (defaults to ~/.support-tool.yaml)
    #[arg(long = "config", env = "SUPPORT_TOOL_CONFIG", value_name = "PATH")]
    pub config_path: Option<PathBuf>,

    /// Maximum number of results fetched for one listing
    #[arg(long = "max-results", env = "SUPPORT_TOOL_MAX_RESULTS")]
    pub max_results: Option<usize>,

    /// Results requested per round trip (the service caps this at 50)
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Directory holding extracted kernel debug images
    #[arg(long = "kern-debug-dir", value_name = "DIR")]
    pub kern_debug_dir: Option<PathBuf>,

    /// Enable file logging (debug)
    #[arg(long = "logs", env = "SUPPORT_TOOL_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Disable all file logging (overrides --logs and log env vars)
    #[arg(long = "no-logs", env = "SUPPORT_TOOL_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,

    /// Allow logging user content such as comments and search terms (debug log only)
    #[arg(
        long = "log-content",
        env = "SUPPORT_TOOL_LOG_CONTENT",
        default_value_t = false
    )]
    pub log_content: bool,

    /// Enable verbose timing logs
    #[arg(long)]
    pub log_timings: bool,
}

impl AppConfig {
    /// Page size after clamping to the upstream cap.
    pub fn effective_page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, UPSTREAM_PAGE_CAP)
    }
}
