//! Process-wide plumbing shared by the library and the binary.

mod logging;

#[cfg(test)]
pub(crate) use logging::LogSwitches;
pub use logging::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
    timings_enabled,
};
