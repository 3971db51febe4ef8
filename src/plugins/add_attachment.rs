//! `addattachment`: upload a local file to a case.

use super::{confirm, expand_home};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::NewAttachment;
use crate::{log_debug, log_debug_content};
use anyhow::{bail, Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

const SUMMARY: &str = "Use the 'addattachment' command to add an attachment to a case.";
const NEEDS_CASE: &str = "ERROR: addattachment requires a case number.";

#[derive(Debug, Parser)]
#[command(
    name = "addattachment",
    about = SUMMARY,
    after_help = "Examples:\n  - addattachment -c 12345678 /var/log/messages\n  - addattachment -c 12345678 -d 'The log file containing the error' /var/log/messages\n  - addattachment -c 12345678"
)]
struct AddAttachmentArgs {
    /// The case number to which the file should be attached (required)
    #[arg(short = 'c', long = "casenumber", value_name = "CASENUMBER")]
    case_number: Option<String>,

    /// true or false; toggles a public or private attachment
    #[arg(short = 'p', long = "public", value_name = "BOOL", action = ArgAction::Set)]
    public: Option<bool>,

    /// A description for the attachment; defaults to one naming the file
    #[arg(short = 'd', long = "description", value_name = "DESCRIPTION")]
    description: Option<String>,

    /// Path of the file to upload
    #[arg(value_name = "FILE")]
    file: Option<String>,
}

pub struct AddAttachmentPlugin;

impl Plugin for AddAttachmentPlugin {
    fn name(&self) -> &str {
        "addattachment"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        AddAttachmentArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<AddAttachmentArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(path) = attachment_path(ctx, args.file.as_deref())? else {
            return Ok(());
        };
        let Some(case_number) = read_case_number(ctx, args.case_number)? else {
            return Ok(());
        };
        let Some(description) = resolve_description(ctx, args.description, &path)? else {
            return Ok(());
        };
        let public = is_public(ctx, args.public)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content =
            fs::read(&path).with_context(|| format!("ERROR: unable to read {}", path.display()))?;
        log_debug_content(&format!("attachment description for {case_number}: {description}"));

        write!(ctx.out, "Uploading {file_name} to the case ... ")?;
        let upload = NewAttachment {
            file_name,
            description,
            public,
            content,
        };
        match ctx.service.add_attachment(&case_number, &upload) {
            Ok(meta) => {
                writeln!(ctx.out, "completed successfully.")?;
                log_debug(&format!(
                    "attached {} ({} bytes) to case {case_number}",
                    meta.uuid, meta.length
                ));
                Ok(())
            }
            Err(err) => {
                writeln!(ctx.out, "failed.")?;
                tracing::warn!(case = %case_number, error = %err, "attachment upload failed");
                Err(err.into())
            }
        }
    }
}

/// Path from the command line, or prompted for until it names a regular file.
fn attachment_path(ctx: &mut ShellContext<'_>, given: Option<&str>) -> Result<Option<PathBuf>> {
    if let Some(raw) = given {
        let path = expand_home(raw);
        if !path.is_file() {
            bail!("ERROR: {} is not a valid file.", path.display());
        }
        return Ok(Some(path));
    }
    if !ctx.is_interactive() {
        bail!("ERROR: addattachment requires a path to a file.");
    }
    loop {
        let Some(line) = ctx.read_line("Please provide the full path to the file (or 'q' to exit): ")?
        else {
            return Ok(None);
        };
        let line = line.trim();
        if line == "q" {
            return Ok(None);
        }
        let path = expand_home(line);
        if path.is_file() {
            return Ok(Some(path));
        }
        writeln!(ctx.out, "ERROR: {} is not a valid file.", path.display())?;
    }
}

/// Case numbers are numeric; interactive input re-prompts until one is given.
fn read_case_number(ctx: &mut ShellContext<'_>, given: Option<String>) -> Result<Option<String>> {
    if let Some(number) = given {
        return Ok(Some(number));
    }
    if !ctx.is_interactive() {
        bail!("{NEEDS_CASE}");
    }
    loop {
        let Some(line) = ctx.read_line("Please provide a case number (or 'q' to exit): ")? else {
            return Ok(None);
        };
        match line.trim() {
            "q" => return Ok(None),
            "" => writeln!(ctx.out, "{NEEDS_CASE}")?,
            number if number.chars().all(|c| c.is_ascii_digit()) => {
                return Ok(Some(number.to_string()));
            }
            other => writeln!(ctx.out, "ERROR: {other} is not a valid case number.")?,
        }
    }
}

fn default_description(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("File {name}")
}

/// `None` only when the user quits at the prompt.
fn resolve_description(
    ctx: &mut ShellContext<'_>,
    given: Option<String>,
    path: &Path,
) -> Result<Option<String>> {
    if let Some(description) = given.filter(|d| !d.trim().is_empty()) {
        return Ok(Some(description));
    }
    if ctx.is_interactive() {
        let answer = ctx.read_line(
            "Please provide a description or enter to accept default (or 'q' to exit): ",
        )?;
        match answer.as_deref().map(str::trim) {
            Some("q") => return Ok(None),
            Some(text) if !text.is_empty() => return Ok(Some(text.to_string())),
            _ => {}
        }
    }
    Ok(Some(default_description(path)))
}

fn is_public(ctx: &mut ShellContext<'_>, given: Option<bool>) -> Result<bool> {
    if let Some(public) = given {
        return Ok(public);
    }
    if !(ctx.is_interactive() && ctx.settings.ponies) {
        return Ok(true);
    }
    confirm(ctx, "Is this a public attachment ([y]/n)? ", true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, temp_dir, TestShell};

    fn run(shell: &TestShell, mode: RunMode, input: &str, args: &[&str]) -> (Result<()>, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        shell.run(mode, input, |ctx| ctx.launch("addattachment", &args))
    }

    fn messages_file(label: &str) -> (PathBuf, String) {
        let dir = temp_dir(label);
        let path = dir.join("messages");
        fs::write(&path, "kernel: oops\n").expect("write file");
        let raw = path.to_string_lossy().into_owned();
        (dir, raw)
    }

    #[test]
    fn batch_upload_uses_default_description() {
        let (dir, file) = messages_file("addatt-batch");
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = run(&shell, RunMode::Batch, "", &["-c", "00000002", &file]);
        result.expect("addattachment");
        assert_eq!(out, "Uploading messages to the case ... completed successfully.\n");
        let listed = shell.service.list_attachments("00000002").expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].file_name, "messages");
        assert_eq!(listed[0].length, 13);
        assert_eq!(listed[0].description.as_deref(), Some("File messages"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn interactive_prompts_fill_in_missing_values() {
        let (dir, file) = messages_file("addatt-prompts");
        let shell = TestShell::new(sample_snapshot());
        let input = format!("/no/such/file\n{file}\n\nabc\n00000001\nBoot log\n");
        let (result, out) = run(&shell, RunMode::Interactive, &input, &[]);
        result.expect("addattachment");
        assert!(out.contains("ERROR: /no/such/file is not a valid file."));
        assert!(out.contains(NEEDS_CASE));
        assert!(out.contains("ERROR: abc is not a valid case number."));
        let listed = shell.service.list_attachments("00000001").expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].description.as_deref(), Some("Boot log"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn quitting_at_the_description_uploads_nothing() {
        let (dir, file) = messages_file("addatt-quit");
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Interactive, "q\n", &["-c", "00000002", &file]);
        result.expect("quit");
        assert!(shell
            .service
            .list_attachments("00000002")
            .expect("list")
            .is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_rejected_in_batch() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "00000001"]);
        assert_eq!(
            result.expect_err("file").to_string(),
            "ERROR: addattachment requires a path to a file."
        );
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "00000001", "/no/such/file"]);
        assert_eq!(
            result.expect_err("file").to_string(),
            "ERROR: /no/such/file is not a valid file."
        );
    }

    #[test]
    fn unknown_case_reports_failed_upload() {
        let (dir, file) = messages_file("addatt-unknown");
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = run(&shell, RunMode::Batch, "", &["-c", "404", &file]);
        assert_eq!(result.expect_err("unknown").to_string(), "Unable to find case 404");
        assert_eq!(out, "Uploading messages to the case ... failed.\n");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn ponies_asks_whether_the_attachment_is_public() {
        let (dir, file) = messages_file("addatt-ponies");
        let mut shell = TestShell::new(sample_snapshot());
        shell.settings = Settings {
            ponies: true,
            ..Settings::default()
        };
        let (result, out) = run(
            &shell,
            RunMode::Interactive,
            "\nn\n",
            &["-c", "00000002", &file],
        );
        result.expect("addattachment");
        assert!(out.contains("Is this a public attachment ([y]/n)? "));
        let _ = fs::remove_dir_all(dir);
    }
}
