//! Support Tool - interactive and batch shell over a ticketing service.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::panic;
use std::rc::Rc;
use support_tool::console::Style;
use support_tool::plugin::{PluginRegistry, ShellContext};
use support_tool::service::{FixtureService, OfflineService, ServiceHandle};
use support_tool::terminal::{stdout_is_terminal, LiveTerminal, RunMode};
use support_tool::{init_logging, log_debug, log_debug_content, log_file_path, log_panic, shell};

use crate::cli::ShellCli;

fn main() -> Result<()> {
    let mut cli = ShellCli::parse();
    cli.app.validate()?;
    init_logging(&cli.app);
    install_panic_hook();
    log_debug("=== Support Tool Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    let settings = cli.app.resolve_settings()?;
    let service: ServiceHandle = match &cli.app.fixture {
        Some(path) => Rc::new(FixtureService::load(path)?),
        None => {
            log_debug("no fixture configured; using offline service");
            Rc::new(OfflineService)
        }
    };
    let registry = PluginRegistry::new();
    let mode = if cli.is_batch() {
        RunMode::Batch
    } else {
        RunMode::Interactive
    };
    let live = LiveTerminal::new(mode);
    let on_terminal = stdout_is_terminal();
    let style = Style {
        bold: on_terminal,
        pager: on_terminal,
    };

    let mut argv = cli.command.clone();
    if mode == RunMode::Batch {
        if let Some(piped) = piped_stdin()? {
            log_debug_content(&format!("piped input: {piped}"));
            argv.push(piped);
        }
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut ctx = ShellContext {
        registry: &registry,
        service,
        settings: &settings,
        mode,
        metrics: &live,
        input: &mut input,
        out: &mut out,
        style,
    };
    let result = match mode {
        RunMode::Interactive => shell::run_interactive(&mut ctx),
        RunMode::Batch => shell::run_batch(&mut ctx, &argv),
    };
    if let Err(err) = &result {
        log_debug(&format!("exiting with error: {err:#}"));
    }
    log_debug("=== Support Tool Exited ===");
    result
}

/// Contents of a non-terminal stdin, if any.
fn piped_stdin() -> Result<Option<String>> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut piped = String::new();
    stdin
        .lock()
        .read_to_string(&mut piped)
        .context("failed to read piped input")?;
    let piped = piped.trim_end_matches(['\n', '\r']);
    Ok((!piped.trim().is_empty()).then(|| piped.to_string()))
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        log_panic(info);
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        log_debug(&format!("panic at {location}"));
        previous(info);
    }));
}
