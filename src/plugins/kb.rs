//! `kb`: show one knowledge base solution.

use super::search::solution_url;
use super::{require_value, section_header};
use crate::console::Style;
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::Solution;
use anyhow::Result;
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'kb' command to find a knowledge base solution by ID";

#[derive(Debug, Parser)]
#[command(name = "kb", about = SUMMARY, after_help = "Example:\n  - kb 63568")]
struct KbArgs {
    /// Knowledge base solution ID
    #[arg(value_name = "SOLUTIONID")]
    solution_id: Option<String>,
}

pub struct KbPlugin;

impl Plugin for KbPlugin {
    fn name(&self) -> &str {
        "kb"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        KbArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<KbArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(id) = require_value(
            ctx,
            args.solution_id,
            "Please provide the knowledge base solution ID (or 'q' to exit): ",
            "ERROR: kb requires a knowledge base solution ID. Try 'help kb' for more information.",
        )?
        else {
            return Ok(());
        };
        let solution = ctx.service.get_solution(&id)?;
        let doc = solution_document(&solution, ctx.style);
        ctx.page(&doc)
    }
}

fn solution_document(solution: &Solution, style: Style) -> String {
    let mut doc = section_header(style, "Title");
    doc.push_str(&format!("{}\n", solution.title));
    doc.push_str(&format!("{:<10}  {}\n", "ID:", solution.id));
    doc.push_str(&format!("{:<10}  {}\n", "State:", solution.state));
    doc.push_str(&format!("{:<10}  {}\n", "URL:", solution_url(solution)));

    let sections = [
        ("Issue", &solution.issue),
        ("Environment", &solution.environment),
        ("Resolution", &solution.resolution),
        ("Root Cause", &solution.root_cause),
        ("Diagnostic Steps", &solution.diagnostic_steps),
    ];
    for (title, body) in sections {
        if let Some(body) = body {
            doc.push_str(&section_header(style, title));
            doc.push_str(body);
            doc.push('\n');
        }
    }
    doc
}
