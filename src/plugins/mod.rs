//! Built-in commands.

mod add_attachment;
mod add_comment;
mod config;
mod get_attachment;
mod get_case;
mod kb;
mod list_attachments;
mod list_cases;
mod list_entitlements;
mod list_kerneldebugs;
mod list_versions;
mod modify_case;
mod open_case;
mod rm_kerneldebug;
mod search;

pub use add_attachment::AddAttachmentPlugin;
pub use add_comment::AddCommentPlugin;
pub use config::ConfigPlugin;
pub use get_attachment::GetAttachmentPlugin;
pub use get_case::GetCasePlugin;
pub use kb::KbPlugin;
pub use list_attachments::ListAttachmentsPlugin;
pub use list_cases::ListCasesPlugin;
pub use list_entitlements::ListEntitlementsPlugin;
pub use list_kerneldebugs::ListKernelDebugsPlugin;
pub use list_versions::ListVersionsPlugin;
pub use modify_case::ModifyCasePlugin;
pub use open_case::OpenCasePlugin;
pub use rm_kerneldebug::RmKernelDebugPlugin;
pub use search::SearchPlugin;

use crate::console::Style;
use crate::plugin::{Plugin, ShellContext};
use anyhow::{bail, Result};
use std::path::PathBuf;

/// Width of section rulers and record separators.
pub const MAX_RULE: usize = 79;

pub(crate) fn builtin() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(AddAttachmentPlugin),
        Box::new(AddCommentPlugin),
        Box::new(ConfigPlugin),
        Box::new(GetAttachmentPlugin),
        Box::new(GetCasePlugin),
        Box::new(KbPlugin),
        Box::new(ListAttachmentsPlugin),
        Box::new(ListCasesPlugin),
        Box::new(ListEntitlementsPlugin),
        Box::new(ListKernelDebugsPlugin),
        Box::new(ListVersionsPlugin),
        Box::new(ModifyCasePlugin),
        Box::new(OpenCasePlugin),
        Box::new(RmKernelDebugPlugin),
        Box::new(SearchPlugin),
    ]
}

/// "1536 bytes (1 KB)" style length. Whole units only.
pub fn friendly_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB {
        format!("{bytes} bytes ({} MB)", bytes / MIB)
    } else if bytes >= KIB {
        format!("{bytes} bytes ({} KB)", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Bold title over a `=` ruler, preceded by a blank line.
pub(crate) fn section_header(style: Style, title: &str) -> String {
    format!(
        "\n{}\n{}\n",
        style.bold(title),
        style.bold(&"=".repeat(MAX_RULE))
    )
}

/// Dashed line closing one record in a listing.
pub(crate) fn record_separator(style: Style) -> String {
    format!("\n\n{}\n\n", style.bold(&"-".repeat(MAX_RULE)))
}

/// Value from the command line, or a prompt when interactive.
///
/// Returns `None` when the user types `q`. A blank answer, or a missing value in
/// batch mode, fails with `missing`.
pub(crate) fn require_value(
    ctx: &mut ShellContext<'_>,
    given: Option<String>,
    prompt: &str,
    missing: &str,
) -> Result<Option<String>> {
    if let Some(value) = given.filter(|value| !value.trim().is_empty()) {
        return Ok(Some(value.trim().to_string()));
    }
    if !ctx.is_interactive() {
        bail!("{missing}");
    }
    let Some(line) = ctx.read_line(prompt)? else {
        bail!("{missing}");
    };
    match line.trim() {
        "q" => Ok(None),
        "" => bail!("{missing}"),
        value => Ok(Some(value.to_string())),
    }
}

/// Numbered pick list. Returns the 0-based index, or `None` on `q` or end of input.
/// Anything else that is not a listed number re-prompts.
pub(crate) fn select_index(
    ctx: &mut ShellContext<'_>,
    noun: &str,
    labels: &[String],
) -> Result<Option<usize>> {
    for (index, label) in labels.iter().enumerate() {
        writeln!(ctx.out, " {:<3} {label}", index + 1)?;
    }
    let prompt = format!("Please select a {noun} (or 'q' to exit): ");
    loop {
        let Some(line) = ctx.read_line(&prompt)? else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }
        match line.parse::<usize>() {
            Ok(n) if (1..=labels.len()).contains(&n) => return Ok(Some(n - 1)),
            _ => writeln!(ctx.out, "ERROR: Invalid {noun} selection.")?,
        }
    }
}

/// `(y/N)` style question. Only an explicit answer overrides `default`.
pub(crate) fn confirm(ctx: &mut ShellContext<'_>, question: &str, default: bool) -> Result<bool> {
    let answer = ctx.read_line(question)?;
    Ok(match answer.as_deref().map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("y" | "yes") => true,
        Some("n" | "no") => false,
        _ => default,
    })
}

/// Case-insensitive exact match, returned in the service's spelling.
pub(crate) fn find_exact<'a>(values: &'a [String], given: &str) -> Option<&'a String> {
    values.iter().find(|value| value.eq_ignore_ascii_case(given))
}

/// First value containing `given`, ignoring case ("urgent" finds "1 (Urgent)").
pub(crate) fn find_containing<'a>(values: &'a [String], given: &str) -> Option<&'a String> {
    let given = given.to_lowercase();
    values
        .iter()
        .find(|value| value.to_lowercase().contains(&given))
}

/// Leading `~/` replaced with `$HOME`.
pub(crate) fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(raw),
    }
}

/// Severity name without its level ("1 (Urgent)" -> "Urgent").
pub(crate) fn severity_name(severity: &str) -> &str {
    severity
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(name, _)| name.trim())
        .unwrap_or(severity)
}
