//! Command plugins and the context they run in.

use crate::config::Settings;
use crate::console::{page_through, run_shell_command, Style};
use crate::service::ServiceHandle;
use crate::terminal::{MetricsSource, RunMode, TerminalMetrics};
use crate::{log_debug, plugins};
use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use std::io::{BufRead, Write};

/// A command reachable from the main prompt, from batch mode, or from another command.
pub trait Plugin {
    /// Name typed at the prompt.
    fn name(&self) -> &str;

    /// One-line description for the help listing.
    fn summary(&self) -> &str;

    /// Argument parser; also used to print `<name> -h`.
    fn command(&self) -> clap::Command;

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()>;
}

/// Registry of available commands, built once at startup.
pub struct PluginRegistry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Create a registry holding every built-in command.
    pub fn new() -> Self {
        Self {
            plugins: plugins::builtin(),
        }
    }

    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Look up a plugin by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        let name_lower = name.to_lowercase();
        self.plugins
            .iter()
            .find(|p| p.name().to_lowercase() == name_lower)
            .map(|p| p.as_ref())
    }

    /// Plugin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Plugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }
}

/// Everything a running command may touch. Nested commands borrow the same context.
pub struct ShellContext<'a> {
    pub registry: &'a PluginRegistry,
    pub service: ServiceHandle,
    pub settings: &'a Settings,
    pub mode: RunMode,
    pub metrics: &'a dyn MetricsSource,
    pub input: &'a mut dyn BufRead,
    pub out: &'a mut dyn Write,
    pub style: Style,
}

impl ShellContext<'_> {
    pub fn is_interactive(&self) -> bool {
        self.mode.is_interactive()
    }

    /// Fresh terminal snapshot.
    pub fn metrics(&self) -> Option<TerminalMetrics> {
        self.metrics.metrics()
    }

    /// Terminal width, or 80 columns without a terminal.
    pub fn width(&self) -> usize {
        self.metrics()
            .map(|m| m.cols)
            .unwrap_or(crate::menu::DEFAULT_WIDTH)
    }

    /// Print `prompt` and read one line. `None` means end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Show a document, through the pager when attached to a terminal.
    pub fn page(&mut self, doc: &str) -> Result<()> {
        if self.style.pager && self.is_interactive() {
            self.out.flush()?;
            return page_through(doc);
        }
        self.out.write_all(doc.as_bytes())?;
        if !doc.ends_with('\n') {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn shell_escape(&mut self, command: &str) -> Result<()> {
        run_shell_command(command, self.out)
    }

    /// Run another command by name with already split arguments.
    pub fn launch(&mut self, name: &str, args: &[String]) -> Result<()> {
        let registry = self.registry;
        let plugin = registry
            .get(name)
            .ok_or_else(|| anyhow!("unknown command '{name}'"))?;
        log_debug(&format!("launching {}", plugin.name()));
        tracing::debug!(command = plugin.name(), "launch");
        plugin.run(self, args)
    }

    /// Run another command from an unsplit argument line.
    pub fn launch_line(&mut self, name: &str, line: &str) -> Result<()> {
        let args = shell_words::split(line)
            .with_context(|| format!("failed to parse arguments for {name}"))?;
        self.launch(name, &args)
    }
}

/// Parse `args` against a plugin's `command`. Help output is printed and yields
/// `None`; other parse errors are returned with clap's rendered message.
pub fn parse_args<T: clap::FromArgMatches>(
    ctx: &mut ShellContext<'_>,
    command: clap::Command,
    args: &[String],
) -> Result<Option<T>> {
    let name = command.get_name().to_string();
    let argv = std::iter::once(name).chain(args.iter().cloned());
    let parsed = command
        .try_get_matches_from(argv)
        .and_then(|matches| T::from_arg_matches(&matches));
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(ctx.out, "{}", err.render())?;
            Ok(None)
        }
        Err(err) => Err(anyhow!("{}", err.render().to_string().trim_end())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_snapshot, TestShell};

    #[test]
    fn registry_lookup_is_case_insensitive() {
        let registry = PluginRegistry::new();
        assert!(registry.get("listcases").is_some());
        assert!(registry.get("ListCases").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_names_are_sorted() {
        let registry = PluginRegistry::new();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        for expected in [
            "addattachment",
            "addcomment",
            "config",
            "getattachment",
            "getcase",
            "kb",
            "listattachments",
            "listcases",
            "listentitlements",
            "listkerneldebugs",
            "listversions",
            "modifycase",
            "opencase",
            "rmkerneldebug",
            "search",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn empty_registry_has_no_commands() {
        assert!(PluginRegistry::empty().names().is_empty());
    }

    #[derive(Debug, clap::Parser)]
    #[command(name = "demo", about = "Demo command")]
    struct DemoArgs {
        #[arg(short = 'c', long = "casenumber")]
        case: Option<String>,
    }

    fn demo_command() -> clap::Command {
        <DemoArgs as clap::CommandFactory>::command()
    }

    #[test]
    fn parse_args_prints_help_instead_of_exiting() {
        let shell = TestShell::new(Default::default());
        let (result, out) = shell.run(RunMode::Interactive, "", |ctx| {
            parse_args::<DemoArgs>(ctx, demo_command(), &["--help".to_string()])
        });
        assert!(result.expect("help is not an error").is_none());
        assert!(out.contains("Usage: demo"));
    }

    #[test]
    fn parse_args_reports_unknown_flags() {
        let shell = TestShell::new(Default::default());
        let (result, _) = shell.run(RunMode::Interactive, "", |ctx| {
            parse_args::<DemoArgs>(ctx, demo_command(), &["--bogus".to_string()])
        });
        let err = result.expect_err("unknown flag");
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn parse_args_reads_values() {
        let shell = TestShell::new(Default::default());
        let args = ["-c".to_string(), "00000001".to_string()];
        let (result, _) = shell.run(RunMode::Batch, "", |ctx| {
            parse_args::<DemoArgs>(ctx, demo_command(), &args)
        });
        let parsed = result.expect("parse").expect("not help");
        assert_eq!(parsed.case.as_deref(), Some("00000001"));
    }

    #[test]
    fn launch_line_splits_quoted_arguments() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch_line("kb", "'1001'")
        });
        result.expect("kb");
        assert!(out.contains("Kernel panic after update"));
    }
}
