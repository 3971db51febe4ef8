//! `addcomment`: post a comment on a case.

use super::require_value;
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::{log_debug, log_debug_content};
use anyhow::{bail, Result};
use clap::{ArgAction, CommandFactory, Parser};

const SUMMARY: &str = "Use the 'addcomment' command to add a comment to a case.";
const NO_CONTENT: &str = "ERROR: The comment has no content.";

#[derive(Debug, Parser)]
#[command(
    name = "addcomment",
    about = SUMMARY,
    after_help = "Examples:\n  - addcomment -c 12345678 Lorem ipsum dolor sit amet\n  - addcomment -c 12345678"
)]
struct AddCommentArgs {
    /// The case number to which the comment should be added (required)
    #[arg(short = 'c', long = "casenumber", value_name = "CASENUMBER")]
    case_number: Option<String>,

    /// true or false; toggles a public or private comment
    #[arg(short = 'p', long = "public", value_name = "BOOL", action = ArgAction::Set)]
    public: Option<bool>,

    /// Comment text
    #[arg(value_name = "TEXT", num_args = 0..)]
    text: Vec<String>,
}

pub struct AddCommentPlugin;

impl Plugin for AddCommentPlugin {
    fn name(&self) -> &str {
        "addcomment"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        AddCommentArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<AddCommentArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(case_number) = require_value(
            ctx,
            args.case_number.clone(),
            "Please provide a case number (or 'q' to exit): ",
            "ERROR: addcomment requires a case number.",
        )?
        else {
            return Ok(());
        };
        let text = comment_text(ctx, &args)?;
        let public = is_public(ctx, args.public)?;

        log_debug_content(&format!("comment for {case_number}: {text}"));
        ctx.service.add_comment(&case_number, &text, public)?;
        log_debug(&format!("added comment to case {case_number}"));
        writeln!(ctx.out, "Successfully added comment to case {case_number}")?;
        Ok(())
    }
}

fn comment_text(ctx: &mut ShellContext<'_>, args: &AddCommentArgs) -> Result<String> {
    let text = if !args.text.is_empty() {
        args.text.join(" ")
    } else if ctx.is_interactive() {
        ctx.read_line("Type your comment: ")?.unwrap_or_default()
    } else {
        bail!("ERROR: addcomment requires text for the comment.");
    };
    let text = text.trim();
    if text.is_empty() {
        bail!("{NO_CONTENT}");
    }
    Ok(text.to_string())
}

/// `-p` wins; otherwise ask when moderation details are enabled, else public.
fn is_public(ctx: &mut ShellContext<'_>, given: Option<bool>) -> Result<bool> {
    if let Some(public) = given {
        return Ok(public);
    }
    if !(ctx.is_interactive() && ctx.settings.ponies) {
        return Ok(true);
    }
    let answer = ctx.read_line("Is this a public comment ([y]/n)? ")?;
    Ok(!matches!(answer.as_deref().map(str::trim), Some("n" | "N")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, TestShell};

    fn run(shell: &TestShell, mode: RunMode, input: &str, args: &[&str]) -> (Result<()>, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        shell.run(mode, input, |ctx| ctx.launch("addcomment", &args))
    }

    #[test]
    fn text_arguments_become_the_comment() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000002", "Disk", "is", "fine", "now"],
        );
        result.expect("addcomment");
        assert_eq!(out, "Successfully added comment to case 00000002\n");
        let case = shell.service.get_case("00000002").expect("case");
        assert_eq!(case.comments[0].text, "Disk is fine now");
        assert!(case.comments[0].public);
    }

    #[test]
    fn private_flag_is_respected() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(
            &shell,
            RunMode::Batch,
            "",
            &["-c", "00000001", "-p", "false", "internal"],
        );
        result.expect("addcomment");
        let case = shell.service.get_case("00000001").expect("case");
        assert!(!case.comments[0].public);
    }

    #[test]
    fn interactive_reads_one_line() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = run(&shell, RunMode::Interactive, "Rebooted OK\n", &["-c", "00000001"]);
        result.expect("addcomment");
        assert!(out.contains("Type your comment: "));
        let case = shell.service.get_case("00000001").expect("case");
        assert_eq!(case.comments[0].text, "Rebooted OK");
    }

    #[test]
    fn blank_comment_is_an_error() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Interactive, "   \n", &["-c", "00000001"]);
        assert_eq!(result.expect_err("blank").to_string(), NO_CONTENT);
        let case = shell.service.get_case("00000001").expect("case");
        assert_eq!(case.comments.len(), 1);
    }

    #[test]
    fn batch_without_text_is_an_error() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "00000001"]);
        assert!(result.is_err());
    }

    #[test]
    fn ponies_asks_whether_the_comment_is_public() {
        let mut shell = TestShell::new(sample_snapshot());
        shell.settings = Settings {
            ponies: true,
            ..Settings::default()
        };
        let (result, out) = run(&shell, RunMode::Interactive, "secret\nn\n", &["-c", "00000001"]);
        result.expect("addcomment");
        assert!(out.contains("Is this a public comment ([y]/n)? "));
        let case = shell.service.get_case("00000001").expect("case");
        assert!(!case.comments[0].public);
    }

    #[test]
    fn unknown_case_is_reported() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Batch, "", &["-c", "404", "hello"]);
        assert_eq!(result.expect_err("missing").to_string(), "Unable to find case 404");
    }
}
