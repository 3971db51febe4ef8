use std::env;
use std::path::PathBuf;

/// Offset ceiling for case listings when nothing is configured.
pub const DEFAULT_CASE_MAX_RESULTS: usize = 1500;
/// Offset ceiling for solution searches when nothing is configured.
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 500;
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest `max_results` value accepted from flags or the settings file.
pub const MAX_RESULTS_CEILING: usize = 10_000;

pub(super) const SETTINGS_FILE_NAME: &str = ".support-tool.yaml";

pub fn default_kern_debug_dir() -> PathBuf {
    PathBuf::from("/var/lib/support-tool/debugkernels")
}

/// Per-user settings file in `$HOME`.
pub fn default_settings_path() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
        .join(SETTINGS_FILE_NAME)
}
