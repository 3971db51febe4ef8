mod app;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod line_budget;
pub mod menu;
pub mod plugin;
pub mod plugins;
pub mod service;
pub mod shell;
mod telemetry;
pub mod terminal;
#[cfg(test)]
mod test_support;

pub use app::{
    crash_log_path, init_logging, log_debug, log_debug_content, log_file_path, log_panic,
    timings_enabled,
};
