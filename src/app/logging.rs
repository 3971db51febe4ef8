use crate::config::AppConfig;
use crate::telemetry::init_tracing;
use std::{
    env, fs,
    io::Write,
    panic,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
const CRASH_LOG_MAX_BYTES: u64 = 256 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);
static TIMINGS_ENABLED: AtomicBool = AtomicBool::new(false);
static DEBUG_LOG: OnceLock<Mutex<Option<LogFile>>> = OnceLock::new();

/// Path to the debug log in the temp dir.
pub fn log_file_path() -> PathBuf {
    env::temp_dir().join("support_tool.log")
}

/// Path to the crash log. Panic payloads are written only with `--log-content`.
pub fn crash_log_path() -> PathBuf {
    env::temp_dir().join("support_tool_crash.log")
}

/// Which sinks are on, derived once from the CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LogSwitches {
    pub(crate) enabled: bool,
    pub(crate) content: bool,
    pub(crate) timings: bool,
}

impl LogSwitches {
    /// `--no-logs` wins over everything; `--log-timings` implies `--logs`.
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        let enabled = (config.logs || config.log_timings) && !config.no_logs;
        Self {
            enabled,
            content: enabled && config.log_content,
            timings: enabled && config.log_timings,
        }
    }

    /// Flip the process-wide switches and (re)open the debug log.
    pub(crate) fn apply(self) {
        LOG_ENABLED.store(self.enabled, Ordering::Relaxed);
        LOG_CONTENT_ENABLED.store(self.content, Ordering::Relaxed);
        TIMINGS_ENABLED.store(self.timings, Ordering::Relaxed);
        let mut slot = debug_log()
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = if self.enabled {
            LogFile::open(log_file_path(), LOG_MAX_BYTES)
        } else {
            None
        };
    }
}

/// Append-only log file that starts over once it would grow past `max_bytes`.
struct LogFile {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    len: u64,
}

impl LogFile {
    fn open(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let existing = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        let truncate = existing > max_bytes;
        let file = fs::OpenOptions::new()
            .create(true)
            .append(!truncate)
            .write(true)
            .truncate(truncate)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            max_bytes,
            len: if truncate { 0 } else { existing },
        })
    }

    fn write_line(&mut self, line: &str) {
        let next = line.len() as u64;
        if self.len.saturating_add(next) > self.max_bytes {
            if let Ok(fresh) = fs::File::create(&self.path) {
                self.file = fresh;
                self.len = 0;
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(next);
        }
    }
}

fn debug_log() -> &'static Mutex<Option<LogFile>> {
    DEBUG_LOG.get_or_init(|| Mutex::new(None))
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Configure the debug log, crash log and trace sink from the CLI flags.
pub fn init_logging(config: &AppConfig) {
    let switches = LogSwitches::from_config(config);
    switches.apply();
    if switches.enabled {
        init_tracing();
    }
}

/// Whether `--log-timings` asked for per-fetch timing lines.
pub fn timings_enabled() -> bool {
    TIMINGS_ENABLED.load(Ordering::Relaxed)
}

/// Append a debug line to the temp log; stdout belongs to the shell.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let line = format!("[{}] {msg}\n", unix_seconds());
    let mut slot = debug_log()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(log) = slot.as_mut() {
        log.write_line(&line);
    }
}

/// Log lines carrying user content: comments, search terms, menu input.
pub fn log_debug_content(msg: &str) {
    if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        log_debug(msg);
    }
}

/// Record a panic location in the crash log.
pub fn log_panic(info: &panic::PanicHookInfo<'_>) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let location = info
        .location()
        .map(|loc| format!("{}:{}", loc.file(), loc.line()))
        .unwrap_or_else(|| "unknown".to_string());
    let payload = if LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        info.payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string())
    } else {
        "payload omitted".to_string()
    };
    let line = format!(
        "[{}] support-tool {} panicked at {location}: {payload}\n",
        unix_seconds(),
        env!("CARGO_PKG_VERSION")
    );
    if let Some(mut crash_log) = LogFile::open(crash_log_path(), CRASH_LOG_MAX_BYTES) {
        crash_log.write_line(&line);
    }
}
