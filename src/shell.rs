//! Top-level command prompt and batch entry point.

use crate::line_budget::wrap;
use crate::plugin::ShellContext;
use crate::{log_debug, log_debug_content};
use anyhow::{bail, Result};

pub const WELCOME: &str = "Welcome to the Support Tool.";
pub const PROMPT: &str = "Command (? for help): ";

const BUILTIN_HELP: &[(&str, &str)] = &[
    ("e", "Exit the application."),
    ("help", "List available commands, or show help for one command."),
    ("q", "Exit the application."),
    ("shell", "Execute a shell command. You can also use '!'"),
];

/// Whether the prompt loop keeps going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Exit,
}

/// "Documented commands" listing with descriptions wrapped under the name column.
pub fn render_help(interactive: bool, entries: &[(String, String)], width: usize) -> String {
    let header = if interactive {
        "Documented commands (type help <topic>):"
    } else {
        "Documented commands (<topic> -h,--help):"
    };
    let mut sorted: Vec<&(String, String)> = entries.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    let longest = sorted.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let indent = " ".repeat(longest + 1);

    let mut out = format!("\n{header}\n{}\n", "=".repeat(header.len()));
    for (name, text) in sorted {
        let line = format!("{name:<longest$} {text}");
        for wrapped in wrap(&line, width, &indent) {
            out.push_str(&wrapped);
            out.push('\n');
        }
    }
    out.push('\n');
    out
}

fn help_entries(ctx: &ShellContext<'_>) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = ctx
        .registry
        .iter()
        .map(|plugin| (plugin.name().to_string(), plugin.summary().to_string()))
        .collect();
    if ctx.is_interactive() {
        entries.extend(
            BUILTIN_HELP
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string())),
        );
    }
    entries
}

fn print_help(ctx: &mut ShellContext<'_>, topic: &str) -> Result<()> {
    let topic = topic.trim();
    if topic.is_empty() {
        let listing = render_help(ctx.is_interactive(), &help_entries(ctx), ctx.width());
        ctx.out.write_all(listing.as_bytes())?;
        return Ok(());
    }
    if let Some(plugin) = ctx.registry.get(topic) {
        let help = plugin.command().render_long_help();
        writeln!(ctx.out, "{help}")?;
        return Ok(());
    }
    match BUILTIN_HELP.iter().find(|(name, _)| *name == topic) {
        Some((_, text)) => writeln!(ctx.out, "{text}")?,
        None => writeln!(ctx.out, "*** No help on {topic}")?,
    }
    Ok(())
}

/// Interpret one line typed at the main prompt.
pub fn execute_line(ctx: &mut ShellContext<'_>, line: &str) -> Result<ShellFlow> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellFlow::Continue);
    }
    if matches!(line, "e" | "q" | "EOF") {
        return Ok(ShellFlow::Exit);
    }
    if let Some(command) = line.strip_prefix('!') {
        ctx.shell_escape(command)?;
        return Ok(ShellFlow::Continue);
    }
    if let Some(topic) = line.strip_prefix('?') {
        print_help(ctx, topic)?;
        return Ok(ShellFlow::Continue);
    }

    let (name, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    match name {
        "help" => print_help(ctx, rest)?,
        "shell" => ctx.shell_escape(rest)?,
        _ if ctx.registry.get(name).is_some() => ctx.launch_line(name, rest)?,
        _ => writeln!(ctx.out, "*** Unknown syntax: {line}")?,
    }
    Ok(ShellFlow::Continue)
}

/// Read-eval loop for the main prompt. Command errors are printed and the loop continues.
pub fn run_interactive(ctx: &mut ShellContext<'_>) -> Result<()> {
    writeln!(ctx.out, "{WELCOME}")?;
    loop {
        let Some(line) = ctx.read_line(PROMPT)? else {
            writeln!(ctx.out)?;
            return Ok(());
        };
        log_debug_content(&format!("command: {line}"));
        match execute_line(ctx, &line) {
            Ok(ShellFlow::Continue) => {}
            Ok(ShellFlow::Exit) => return Ok(()),
            Err(err) => {
                log_debug(&format!("command failed: {err:#}"));
                tracing::warn!(error = %format!("{err:#}"), "command failed");
                writeln!(ctx.out, "{err:#}")?;
            }
        }
    }
}

/// Run a single command given on the process command line.
pub fn run_batch(ctx: &mut ShellContext<'_>, argv: &[String]) -> Result<()> {
    let Some((name, args)) = argv.split_first() else {
        bail!("no command given");
    };
    if name == "help" {
        return print_help(ctx, &args.join(" "));
    }
    if ctx.registry.get(name).is_none() {
        bail!("Unknown command '{name}'. Use 'help' to list the available commands.");
    }
    ctx.launch(name, args)
}
