//! `rmkerneldebug`: delete extracted debug kernels matching shell-style patterns.

use super::confirm;
use super::list_kerneldebugs::extracted_images;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::log_debug;
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const SUMMARY: &str =
    "Use the 'rmkerneldebug' command to remove currently downloaded debug vmlinux images.";
const INTRO: &str =
    "\nType the number of a vmlinux image to delete or 'e' to return to the previous menu.";
const PROMPT: &str = "Select an image: ";
const NOTHING_TO_REMOVE: &str = "No images to remove.";

#[derive(Debug, Parser)]
#[command(
    name = "rmkerneldebug",
    about = SUMMARY,
    after_help = "Example:\n  - rmkerneldebug kernel-debuginfo-2.6.18-128*"
)]
struct RmKernelDebugArgs {
    /// Does not prompt for confirmation.
    #[arg(short = 'n', long = "noprompt")]
    no_prompt: bool,

    /// Image names; '*' and '?' match like the shell
    #[arg(value_name = "KERNELDEBUGNAME", num_args = 0..)]
    patterns: Vec<String>,
}

pub struct RmKernelDebugPlugin;

impl Plugin for RmKernelDebugPlugin {
    fn name(&self) -> &str {
        "rmkerneldebug"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        RmKernelDebugArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<RmKernelDebugArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let mut patterns = args.patterns;
        if patterns.is_empty() {
            if !ctx.is_interactive() {
                bail!("ERROR: rmkerneldebug requires search string for deletion.");
            }
            patterns.push("*".to_string());
        }

        let dir = ctx.settings.kern_debug_dir.clone();
        let images = matching_images(&dir, &patterns)?;
        if images.is_empty() {
            writeln!(ctx.out, "{NOTHING_TO_REMOVE}")?;
            return Ok(());
        }

        if ctx.is_interactive() {
            let items = images
                .into_iter()
                .map(|name| DisplayItem::new(name, ()))
                .collect();
            let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
            return MenuSession::new(MenuEngine::new(text, items), RemoveHost { dir }).run(ctx);
        }

        writeln!(ctx.out, "The following kernels will be removed:")?;
        for image in &images {
            writeln!(ctx.out, "{image}")?;
        }
        if !args.no_prompt
            && !confirm(
                ctx,
                "Are you sure you wish to remove the above vmlinux images (y/n)? ",
                false,
            )?
        {
            return Ok(());
        }
        report(ctx, &remove_images(&dir, &images))
    }
}

/// Shell glob as an anchored regex. Only `*` and `?` are special.
fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut source = String::from("^");
    for ch in pattern.chars() {
        match ch {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(&other.to_string())),
        }
    }
    source.push('$');
    Regex::new(&source).with_context(|| format!("ERROR: invalid pattern '{pattern}'"))
}

/// Images matching any pattern, in directory order, each listed once.
fn matching_images(dir: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let globs = patterns
        .iter()
        .map(|pattern| glob_regex(pattern))
        .collect::<Result<Vec<_>>>()?;
    Ok(extracted_images(dir)?
        .into_iter()
        .filter(|image| globs.iter().any(|glob| glob.is_match(image)))
        .collect())
}

/// Delete each image directory; returns the names that could not be removed.
fn remove_images(dir: &Path, images: &[String]) -> Vec<String> {
    let mut failed = Vec::new();
    for image in images {
        let path = dir.join(image);
        let removed = path != dir && path.is_dir() && fs::remove_dir_all(&path).is_ok();
        if removed {
            log_debug(&format!("removed kernel debug image {}", path.display()));
        } else {
            tracing::warn!(image = %image, "kernel debug image not removed");
            failed.push(image.clone());
        }
    }
    failed
}

fn report(ctx: &mut ShellContext<'_>, failed: &[String]) -> Result<()> {
    if failed.is_empty() {
        writeln!(ctx.out, "The vmlinux images were successfully removed.")?;
        return Ok(());
    }
    writeln!(ctx.out, "The following vmlinux images were unable to be removed:")?;
    for image in failed {
        writeln!(ctx.out, " - {image}")?;
    }
    Ok(())
}

struct RemoveHost {
    dir: PathBuf,
}

impl MenuHost for RemoveHost {
    type Action = ();
    type Payload = ();

    fn invoke(
        &mut self,
        item: &DisplayItem<(), ()>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), ()>> {
        let failed = remove_images(&self.dir, std::slice::from_ref(&item.label));
        report(ctx, &failed)?;
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), ()>]) -> String {
        items.iter().map(|item| format!("{}\n", item.label)).collect()
    }
}
