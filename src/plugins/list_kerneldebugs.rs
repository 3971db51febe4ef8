//! `listkerneldebugs`: extracted debug kernels under `kern_debug_dir`.

use super::friendly_size;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use anyhow::{anyhow, bail, Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};

const SUMMARY: &str =
    "Use the 'listkerneldebugs' command to list currently downloaded debug vmlinux images.";
const INTRO: &str =
    "\nType the number of a vmlinux image for more details or 'e' to return to the previous menu.";
const PROMPT: &str = "Select an image: ";
const VMLINUX: &str = "vmlinux";

#[derive(Debug, Parser)]
#[command(
    name = "listkerneldebugs",
    about = SUMMARY,
    after_help = "Examples:\n  - listkerneldebugs"
)]
struct ListKernelDebugsArgs {}

pub struct ListKernelDebugsPlugin;

impl Plugin for ListKernelDebugsPlugin {
    fn name(&self) -> &str {
        "listkerneldebugs"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ListKernelDebugsArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        if parse_args::<ListKernelDebugsArgs>(ctx, self.command(), args)?.is_none() {
            return Ok(());
        }
        let dir = ctx.settings.kern_debug_dir.clone();
        let images = extracted_images(&dir)?;
        if images.is_empty() {
            bail!("No vmlinux images were found in {}", dir.display());
        }
        let items = images
            .into_iter()
            .map(|name| {
                let path = dir.join(&name);
                DisplayItem::with_payload(name, (), path)
            })
            .collect();
        let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
        MenuSession::new(MenuEngine::new(text, items), ImageHost).run(ctx)
    }
}

/// Names of subdirectories of `dir` that hold a `vmlinux` file, sorted.
/// A missing directory simply has no images.
pub(super) fn extracted_images(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read kernel debug directory '{}'", dir.display()))?;
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.path().join(VMLINUX).is_file() {
            images.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    images.sort();
    Ok(images)
}

struct ImageHost;

impl MenuHost for ImageHost {
    type Action = ();
    type Payload = PathBuf;

    fn invoke(
        &mut self,
        item: &DisplayItem<(), PathBuf>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), PathBuf>> {
        let image_dir = item
            .payload
            .as_ref()
            .ok_or_else(|| anyhow!("no image recorded for {}", item.label))?;
        let vmlinux = image_dir.join(VMLINUX);
        let size = fs::metadata(&vmlinux)
            .with_context(|| format!("ERROR: {} is no longer available", vmlinux.display()))?
            .len();
        writeln!(ctx.out, "Information for {}", item.label)?;
        writeln!(ctx.out, " Location: {}", vmlinux.display())?;
        writeln!(ctx.out, " Size: {}", friendly_size(size))?;
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), PathBuf>]) -> String {
        items.iter().map(|item| format!("{}\n", item.label)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::terminal::RunMode;
    use crate::test_support::{temp_dir, TestShell};

    fn debug_dir(label: &str) -> PathBuf {
        let dir = temp_dir(label);
        for name in ["2.6.32-431.el6.x86_64", "3.10.0-123.el7.x86_64"] {
            let image = dir.join(name);
            fs::create_dir_all(&image).expect("image dir");
            fs::write(image.join(VMLINUX), vec![0u8; 2048]).expect("vmlinux");
        }
        fs::create_dir_all(dir.join("partial-download")).expect("partial");
        dir
    }

    fn shell_for(dir: &Path) -> TestShell {
        let mut shell = TestShell::new(Default::default());
        shell.settings = Settings {
            kern_debug_dir: dir.to_path_buf(),
            ..Settings::default()
        };
        shell
    }

    #[test]
    fn only_directories_with_vmlinux_are_listed() {
        let dir = debug_dir("kdebug-list");
        assert_eq!(
            extracted_images(&dir).expect("scan"),
            vec!["2.6.32-431.el6.x86_64", "3.10.0-123.el7.x86_64"]
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn batch_prints_image_names() {
        let dir = debug_dir("kdebug-batch");
        let shell = shell_for(&dir);
        let (result, out) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listkerneldebugs", &[])
        });
        result.expect("listkerneldebugs");
        assert_eq!(out, "2.6.32-431.el6.x86_64\n3.10.0-123.el7.x86_64\n");
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn selecting_an_image_shows_location_and_size() {
        let dir = debug_dir("kdebug-select");
        let shell = shell_for(&dir);
        let (result, out) = shell.run(RunMode::Interactive, "2\ne\n", |ctx| {
            ctx.launch("listkerneldebugs", &[])
        });
        result.expect("listkerneldebugs");
        assert!(out.contains("Information for 3.10.0-123.el7.x86_64"));
        assert!(out.contains(" Size: 2048 bytes (2 KB)"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = temp_dir("kdebug-empty");
        let shell = shell_for(&dir);
        let (result, _) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listkerneldebugs", &[])
        });
        assert!(result
            .expect_err("empty")
            .to_string()
            .starts_with("No vmlinux images were found in"));
        let _ = fs::remove_dir_all(dir);
    }
}
