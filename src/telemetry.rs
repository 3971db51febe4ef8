//! Structured trace events as JSON lines, next to the plain debug log.

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// `SUPPORT_TOOL_TRACE_LOG`, else `support_tool_trace.jsonl` in the temp dir.
pub(crate) fn tracing_log_path() -> PathBuf {
    env::var_os("SUPPORT_TOOL_TRACE_LOG")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("support_tool_trace.jsonl"))
}

/// Install the global JSON subscriber once. Later calls are no-ops.
pub(crate) fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(tracing_log_path())
        else {
            return;
        };
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_timer(UtcTime::rfc_3339())
            .with_writer(file)
            .with_target(false)
            .with_current_span(false)
            .with_span_list(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
