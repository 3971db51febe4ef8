//! `config`: read and change the YAML settings file.
//!
//! Changes are written straight to disk. The running shell keeps the settings it
//! started with; new values take effect on the next start.

use crate::config::{default_settings_path, Settings, SettingsFile, SETTINGS_OPTIONS};
use crate::log_debug;
use crate::plugin::{parse_args, Plugin, ShellContext};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'config' command to set or get configuration file values.";

#[derive(Debug, Parser)]
#[command(name = "config", about = SUMMARY)]
struct ConfigArgs {
    /// Save the option in the per-user settings file instead of the active one
    #[arg(short = 'g', long = "global")]
    global: bool,

    /// Unset the option
    #[arg(short = 'u', long = "unset")]
    unset: bool,

    /// Option name
    #[arg(value_name = "OPTION")]
    name: Option<String>,

    /// New value for the option
    #[arg(value_name = "VALUE")]
    value: Option<String>,
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn name(&self) -> &str {
        "config"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ConfigArgs::command().after_help(options_help())
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ConfigArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(name) = args.name.as_deref() else {
            let help = self.command().render_long_help();
            writeln!(ctx.out, "{help}")?;
            return Ok(());
        };
        if !SETTINGS_OPTIONS.iter().any(|(known, _)| *known == name) {
            bail!("ERROR: {name} is not a valid configuration file option.");
        }

        let path = if args.global {
            default_settings_path()
        } else {
            ctx.settings.settings_path.clone()
        };
        let mut file = SettingsFile::load(&path)?;
        if args.unset {
            file.unset(name)?;
            file.save(&path)?;
            log_debug(&format!("unset {name} in {}", path.display()));
            return Ok(());
        }
        match args.value.as_deref() {
            Some(value) => {
                file.set(name, value)?;
                file.save(&path)?;
                log_debug(&format!("set {name} in {}", path.display()));
            }
            None => {
                let value = match file.get(name)? {
                    Some(value) => value,
                    None => effective_value(ctx.settings, name),
                };
                writeln!(ctx.out, "{value}")?;
            }
        }
        Ok(())
    }
}

/// Value currently in force for an option the file does not set.
fn effective_value(settings: &Settings, name: &str) -> String {
    match name {
        "max_results" => settings
            .max_results
            .map(|value| value.to_string())
            .unwrap_or_else(|| "default".to_string()),
        "page_size" => settings.page_size.to_string(),
        "kern_debug_dir" => settings.kern_debug_dir.display().to_string(),
        "ponies" => settings.ponies.to_string(),
        _ => String::new(),
    }
}

fn options_help() -> String {
    let mut text = String::from("The configuration file options which can be set are:\n");
    for (name, help) in SETTINGS_OPTIONS {
        text.push_str(&format!("  {name:<16}{help}\n"));
    }
    text.push_str(
        "\nExamples:\n  - config page_size\n  - config page_size 25\n  - config --unset page_size\n",
    );
    text
}
