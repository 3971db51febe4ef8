//! Terminal size probing for menu pagination.

use crate::log_debug;
use std::io::{self, IsTerminal};

/// Visible rows and columns of the controlling terminal. Both are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalMetrics {
    pub rows: usize,
    pub cols: usize,
}

impl TerminalMetrics {
    /// Build metrics, rejecting a zero dimension.
    pub fn new(rows: usize, cols: usize) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }
}

/// How the process was started: an interactive shell or a single batch command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Batch,
}

impl RunMode {
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Source of terminal metrics; queried on every render so resizes are seen on the next page.
pub trait MetricsSource {
    fn metrics(&self) -> Option<TerminalMetrics>;
}

/// Queries the real terminal through crossterm.
#[derive(Debug, Clone, Copy)]
pub struct LiveTerminal {
    mode: RunMode,
}

impl LiveTerminal {
    pub fn new(mode: RunMode) -> Self {
        Self { mode }
    }
}

impl MetricsSource for LiveTerminal {
    fn metrics(&self) -> Option<TerminalMetrics> {
        if !self.mode.is_interactive() || !io::stdout().is_terminal() {
            return None;
        }
        match crossterm::terminal::size() {
            Ok((cols, rows)) => {
                let metrics = TerminalMetrics::new(usize::from(rows), usize::from(cols));
                if metrics.is_none() {
                    log_debug(&format!(
                        "terminal reported zero size ({cols}x{rows}); paging disabled"
                    ));
                }
                metrics
            }
            Err(err) => {
                log_debug(&format!("terminal size query failed: {err}"));
                None
            }
        }
    }
}

/// Fixed metrics, for tests and for callers that already know the geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics(pub Option<TerminalMetrics>);

impl MetricsSource for FixedMetrics {
    fn metrics(&self) -> Option<TerminalMetrics> {
        self.0
    }
}

/// Whether stdout is attached to a terminal.
pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}
