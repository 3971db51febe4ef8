//! `getattachment`: download case attachments to a local directory.

use super::{expand_home, friendly_size, require_value};
use crate::log_debug;
use crate::plugin::{parse_args, Plugin, ShellContext};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const SUMMARY: &str = "Use the 'getattachment' command to find a specific attachment by number.";

#[derive(Debug, Parser)]
#[command(
    name = "getattachment",
    about = SUMMARY,
    after_help = "Examples:\n  - getattachment -c 12345678 -u 2c92bad4-0b39-4b74-8f51-6c5b2a4b1c3e\n  - getattachment -c 12345678 -a -i '\\.log$' -d /tmp"
)]
struct GetAttachmentArgs {
    /// The case number from which the attachment will be downloaded (required)
    #[arg(short = 'c', long = "casenumber", value_name = "CASENUMBER")]
    case_number: Option<String>,

    /// UUID of the attachment to be downloaded
    #[arg(short = 'u', long = "attachmentuuid", value_name = "UUID")]
    uuid: Option<String>,

    /// Download all attachments for this case
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Only download attachments whose file name matches this regex (with -a)
    #[arg(short = 'i', long = "include", value_name = "REGEX")]
    include: Option<String>,

    /// Skip attachments whose file name matches this regex (with -a)
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    exclude: Option<String>,

    /// Directory to download into (default: current directory)
    #[arg(short = 'd', long = "destdir", value_name = "DIR")]
    dest_dir: Option<PathBuf>,
}

pub struct GetAttachmentPlugin;

impl Plugin for GetAttachmentPlugin {
    fn name(&self) -> &str {
        "getattachment"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        GetAttachmentArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<GetAttachmentArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        check_mode(&args)?;
        let Some(case_number) = require_value(
            ctx,
            args.case_number.clone(),
            "Please provide a case number (or 'q' to exit): ",
            "ERROR: getattachment requires a case number.",
        )?
        else {
            return Ok(());
        };
        let Some(dest_dir) = resolve_dest_dir(ctx, args.dest_dir.clone())? else {
            return Ok(());
        };

        if args.all {
            let filter = NameFilter::new(args.include.as_deref(), args.exclude.as_deref())?;
            return download_all(ctx, &case_number, &dest_dir, &filter);
        }
        let Some(uuid) = require_value(
            ctx,
            args.uuid.clone(),
            "Please provide the UUID of the attachment to be downloaded (or 'q' to exit): ",
            "ERROR: getattachment requires the UUID of the attachment to be downloaded.",
        )?
        else {
            return Ok(());
        };
        download(ctx, &case_number, &uuid, &dest_dir)
    }
}

fn check_mode(args: &GetAttachmentArgs) -> Result<()> {
    if args.all && args.uuid.is_some() {
        bail!("ERROR: -a cannot be used with -u option");
    }
    if !args.all && args.include.is_some() {
        bail!("ERROR: -i is only effective when using -a");
    }
    if !args.all && args.exclude.is_some() {
        bail!("ERROR: -x is only effective when using -a");
    }
    Ok(())
}

/// Destination from `-d`, else asked for interactively, else the working directory.
fn resolve_dest_dir(ctx: &mut ShellContext<'_>, given: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(dir) = given {
        if !dir.is_dir() {
            bail!("ERROR: {} is not a valid directory.", dir.display());
        }
        return Ok(Some(dir));
    }
    if !ctx.is_interactive() {
        return Ok(Some(PathBuf::from(".")));
    }
    loop {
        let Some(line) = ctx.read_line(
            "Please provide a download directory or press enter to use the current directory (or 'q' to exit): ",
        )?
        else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }
        let dir = if line.is_empty() {
            PathBuf::from(".")
        } else {
            expand_home(line)
        };
        if dir.is_dir() {
            return Ok(Some(dir));
        }
        writeln!(ctx.out, "{} is not a valid directory.", dir.display())?;
    }
}

/// Include/exclude patterns applied to file names when downloading everything.
struct NameFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl NameFilter {
    fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("ERROR: invalid regex '{pattern}'"))
        };
        Ok(Self {
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    /// Why a file is skipped, if it is.
    fn skip_reason(&self, file_name: &str) -> Option<&'static str> {
        if let Some(include) = &self.include {
            if !include.is_match(file_name) {
                return Some("does not match include regex");
            }
        }
        match &self.exclude {
            Some(exclude) if exclude.is_match(file_name) => Some("matches exclude regex"),
            _ => None,
        }
    }
}

fn download_all(
    ctx: &mut ShellContext<'_>,
    case_number: &str,
    dest_dir: &Path,
    filter: &NameFilter,
) -> Result<()> {
    let attachments = ctx.service.list_attachments(case_number)?;
    if attachments.is_empty() {
        writeln!(ctx.out, "No attachments found on case {case_number}")?;
        return Ok(());
    }
    for attachment in attachments {
        if let Some(reason) = filter.skip_reason(&attachment.file_name) {
            writeln!(ctx.out, "Skipping {} ({reason})", attachment.file_name)?;
            continue;
        }
        download(ctx, case_number, &attachment.uuid, dest_dir)?;
    }
    Ok(())
}

fn download(ctx: &mut ShellContext<'_>, case_number: &str, uuid: &str, dest_dir: &Path) -> Result<()> {
    let (meta, body) = ctx.service.get_attachment(case_number, uuid)?;
    // Attachment names come from the service; never let them leave `dest_dir`.
    let file_name = Path::new(&meta.file_name)
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| uuid.into());
    let target = dest_dir.join(file_name);
    fs::write(&target, &body)
        .with_context(|| format!("ERROR: failed to write {}", target.display()))?;
    log_debug(&format!(
        "downloaded attachment {uuid} ({} bytes)",
        body.len()
    ));
    writeln!(
        ctx.out,
        "File downloaded to {} ({})",
        target.display(),
        friendly_size(body.len() as u64)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Attachment, FixtureAttachment};
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, temp_dir, TestShell};

    fn run(shell: &TestShell, mode: RunMode, input: &str, args: &[&str]) -> (Result<()>, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        shell.run(mode, input, |ctx| ctx.launch("getattachment", &args))
    }

    #[test]
    fn downloads_into_the_given_directory() {
        let shell = TestShell::new(sample_snapshot());
        let dir = temp_dir("getattachment");
        let dir_arg = dir.display().to_string();
        let (result, out) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000001", "-u", "uuid-1", "-d", &dir_arg],
        );
        result.expect("download");
        assert!(out.contains("File downloaded to"));
        assert!(out.contains("(11 bytes)"));
        assert_eq!(
            fs::read_to_string(dir.join("sosreport.txt")).expect("file"),
            "hello world"
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn download_all_applies_name_filters() {
        let mut snapshot = sample_snapshot();
        if let Some(list) = snapshot.attachments.get_mut("00000001") {
            list.push(FixtureAttachment {
                meta: Attachment {
                    uuid: "uuid-2".to_string(),
                    file_name: "messages.log".to_string(),
                    length: 4,
                    created_by: "Pat Example".to_string(),
                    created_date: "2024-01-05T00:00:00Z".to_string(),
                    description: None,
                },
                content: "boot".to_string(),
            });
        }
        let shell = TestShell::new(snapshot);
        let dir = temp_dir("getattachment-all");
        let dir_arg = dir.display().to_string();
        let (result, out) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000001", "-a", "-x", r"\.txt$", "-d", &dir_arg],
        );
        result.expect("download all");
        assert!(out.contains("Skipping sosreport.txt (matches exclude regex)"));
        assert!(dir.join("messages.log").is_file());
        assert!(!dir.join("sosreport.txt").exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn conflicting_options_are_rejected() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "1", "-a", "-u", "x"]);
        assert_eq!(
            result.expect_err("conflict").to_string(),
            "ERROR: -a cannot be used with -u option"
        );
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "1", "-i", "log"]);
        assert_eq!(
            result.expect_err("include").to_string(),
            "ERROR: -i is only effective when using -a"
        );
    }

    #[test]
    fn missing_uuid_is_an_error_in_batch() {
        let shell = TestShell::new(sample_snapshot());
        let dir = temp_dir("getattachment-nouuid");
        let dir_arg = dir.display().to_string();
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "00000001", "-d", &dir_arg]);
        assert!(result
            .expect_err("no uuid")
            .to_string()
            .contains("requires the UUID"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn invalid_directory_is_rejected() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000001", "-u", "uuid-1", "-d", "/nonexistent/support-tool"],
        );
        assert!(result
            .expect_err("bad dir")
            .to_string()
            .contains("is not a valid directory"));
    }

    #[test]
    fn interactive_directory_prompt_retries_until_valid() {
        let shell = TestShell::new(sample_snapshot());
        let dir = temp_dir("getattachment-prompt");
        let input = format!("/nonexistent/support-tool\n{}\n", dir.display());
        let (result, out) = run(
            &shell,
            RunMode::Interactive,
            &input,
            &["-c", "00000001", "-u", "uuid-1"],
        );
        result.expect("download");
        assert!(out.contains("/nonexistent/support-tool is not a valid directory."));
        assert!(dir.join("sosreport.txt").is_file());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn unsafe_file_names_stay_inside_the_directory() {
        let mut snapshot = sample_snapshot();
        if let Some(list) = snapshot.attachments.get_mut("00000001") {
            list[0].meta.file_name = "../../escape.txt".to_string();
        }
        let shell = TestShell::new(snapshot);
        let dir = temp_dir("getattachment-escape");
        let dir_arg = dir.display().to_string();
        let (result, _) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000001", "-u", "uuid-1", "-d", &dir_arg],
        );
        result.expect("download");
        assert!(dir.join("escape.txt").is_file());
        let _ = fs::remove_dir_all(dir);
    }
}
