//! Output helpers: bold text, the external pager, and shell escapes.

use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};

const DEFAULT_PAGER: &str = "less -R";

/// How output is decorated for the current stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    /// Emit ANSI bold sequences.
    pub bold: bool,
    /// Send long documents through `$PAGER`.
    pub pager: bool,
}

impl Style {
    pub fn bold(&self, text: &str) -> String {
        if self.bold {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

/// Pager command line from `$PAGER`, falling back to `less -R`.
pub fn pager_command() -> Result<Vec<String>> {
    let raw = env::var("PAGER")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string());
    let argv = shell_words::split(&raw).with_context(|| format!("invalid PAGER '{raw}'"))?;
    if argv.is_empty() {
        bail!("PAGER is empty");
    }
    Ok(argv)
}

/// Pipe `doc` through the pager and wait for it to exit.
pub fn page_through(doc: &str) -> Result<()> {
    let argv = pager_command()?;
    let mut child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn pager {}", argv[0]))?;
    if let Some(mut stdin) = child.stdin.take() {
        // A pager quit early closes the pipe; that is not an error.
        let _ = stdin.write_all(doc.as_bytes());
    }
    child.wait().context("failed to wait for pager")?;
    Ok(())
}

/// Run `command` through `sh -c` and copy its output to `out`.
pub fn run_shell_command(command: &str, out: &mut dyn Write) -> Result<()> {
    let command = command.trim();
    if command.is_empty() {
        bail!("ERROR: no shell command given");
    }
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| anyhow!("failed to run '{command}': {err}"))?;
    out.write_all(&output.stdout)?;
    out.write_all(&output.stderr)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_only_when_enabled() {
        let plain = Style::default();
        assert_eq!(plain.bold("Title"), "Title");
        let styled = Style {
            bold: true,
            pager: false,
        };
        assert_eq!(styled.bold("Title"), "\x1b[1mTitle\x1b[0m");
    }

    #[test]
    fn empty_shell_command_is_rejected() {
        let mut out = Vec::new();
        assert!(run_shell_command("   ", &mut out).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn shell_command_output_is_copied() {
        let mut out = Vec::new();
        run_shell_command("echo hello", &mut out).expect("run echo");
        assert_eq!(String::from_utf8_lossy(&out), "hello\n");
    }
}
