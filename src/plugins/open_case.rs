//! `opencase`: open a new support case.

use super::list_versions::INVALID_PRODUCT;
use super::{
    confirm, find_containing, find_exact, require_value, select_index, severity_name, MAX_RULE,
};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{CaseField, NewCase, Product};
use crate::{log_debug, log_debug_content};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use std::path::Path;

const SUMMARY: &str = "Use the 'opencase' command to open a new support case.";
const DESCRIPTION_PROMPT: &str =
    "Please enter a description (finish with a line holding only '.'):";

#[derive(Debug, Parser)]
#[command(
    name = "opencase",
    about = SUMMARY,
    after_help = "Examples:\n  - opencase -s Summary -p 'Enterprise Linux' -v 9.2 -d description"
)]
struct OpenCaseArgs {
    /// The product the case will be opened against (required)
    #[arg(short = 'p', long = "product", value_name = "PRODUCT")]
    product: Option<String>,

    /// The version of the product the case will be opened against (required)
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    version: Option<String>,

    /// A summary for the case (required)
    #[arg(short = 's', long = "summary", value_name = "SUMMARY")]
    summary: Option<String>,

    /// A description for the case (required)
    #[arg(short = 'd', long = "description", value_name = "DESCRIPTION")]
    description: Option<String>,

    /// The severity of the case
    #[arg(short = 'S', long = "severity", value_name = "SEVERITY")]
    severity: Option<String>,

    /// Add an attachment to the newly opened case
    #[arg(short = 'a', long = "attachment", value_name = "FILE")]
    attachment: Option<String>,

    /// Add this case to the designated case group
    #[arg(short = 'g', long = "casegroup", value_name = "GROUP")]
    case_group: Option<String>,
}

pub struct OpenCasePlugin;

impl Plugin for OpenCasePlugin {
    fn name(&self) -> &str {
        "opencase"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        OpenCaseArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<OpenCaseArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(draft) = gather(ctx, &args)? else {
            return Ok(());
        };

        if ctx.is_interactive() && !still_wanted(ctx, &draft.summary)? {
            writeln!(ctx.out, "Thank you for using the Support Tool")?;
            return Ok(());
        }

        log_debug_content(&format!("opening case: {}", draft.summary));
        let case_number = ctx.service.create_case(&draft)?;
        log_debug(&format!("opened case {case_number}"));
        let ruler = ctx.style.bold(&"-".repeat(MAX_RULE));
        writeln!(ctx.out, "{ruler}")?;
        writeln!(ctx.out, "Support case {case_number} has successfully been opened.\n")?;

        match args.attachment {
            Some(file) => {
                let description = format!("File {}", file_label(&file));
                let upload = [
                    "-c".to_string(),
                    case_number,
                    "-d".to_string(),
                    description,
                    file,
                ];
                ctx.launch("addattachment", &upload)?;
            }
            None => {
                writeln!(
                    ctx.out,
                    "Please attach a SoS report to support case {case_number}. Create a SoS report as\n\
                     the root user and execute the following command to attach the SoS report\n\
                     directly to the case:\n support-tool addattachment -c {case_number} <path to sosreport>\n"
                )?;
                if ctx.is_interactive()
                    && confirm(
                        ctx,
                        &format!("Would you like to attach a file to {case_number} at this time? (y/N) "),
                        false,
                    )?
                {
                    ctx.launch("addattachment", &["-c".to_string(), case_number])?;
                }
            }
        }
        Ok(())
    }
}

/// Validate the given values and prompt for the rest. `None` means the user quit.
fn gather(ctx: &mut ShellContext<'_>, args: &OpenCaseArgs) -> Result<Option<NewCase>> {
    let products = ctx.service.list_products()?;
    let Some(product) = pick_product(ctx, &products, args.product.as_deref())? else {
        return Ok(None);
    };
    let Some(version) = pick_version(ctx, product, args.version.as_deref())? else {
        return Ok(None);
    };
    let Some(summary) = require_value(
        ctx,
        args.summary.clone(),
        "Please enter a summary (or 'q' to exit): ",
        "ERROR: opencase requires a summary.",
    )?
    else {
        return Ok(None);
    };
    let description = match args.description.clone().filter(|d| !d.trim().is_empty()) {
        Some(description) => description,
        None => read_description(ctx)?,
    };
    let Some(severity) = pick_severity(ctx, args.severity.as_deref())? else {
        return Ok(None);
    };
    let Some(group_number) = pick_group(ctx, args.case_group.as_deref())? else {
        return Ok(None);
    };
    Ok(Some(NewCase {
        summary,
        product: product.name.clone(),
        version,
        description,
        severity,
        group_number,
    }))
}

fn pick_product<'a>(
    ctx: &mut ShellContext<'_>,
    products: &'a [Product],
    given: Option<&str>,
) -> Result<Option<&'a Product>> {
    if let Some(given) = given {
        let Some(product) = products
            .iter()
            .find(|product| product.name.eq_ignore_ascii_case(given.trim()))
        else {
            bail!("{INVALID_PRODUCT}");
        };
        return Ok(Some(product));
    }
    if !ctx.is_interactive() {
        bail!("ERROR: opencase requires a product.");
    }
    let names: Vec<String> = products.iter().map(|product| product.name.clone()).collect();
    Ok(select_index(ctx, "product", &names)?.map(|index| &products[index]))
}

fn pick_version(
    ctx: &mut ShellContext<'_>,
    product: &Product,
    given: Option<&str>,
) -> Result<Option<String>> {
    if let Some(given) = given {
        let Some(version) = find_exact(&product.versions, given.trim()) else {
            bail!("ERROR: Invalid version provided.");
        };
        return Ok(Some(version.clone()));
    }
    if !ctx.is_interactive() {
        bail!("ERROR: opencase requires a version.");
    }
    if product.versions.is_empty() {
        bail!("ERROR: {} has no versions to open a case against.", product.name);
    }
    let picked = select_index(ctx, "version", &product.versions)?;
    Ok(picked.map(|index| product.versions[index].clone()))
}

/// Lines up to a lone `.` or end of input, trimmed.
fn read_description(ctx: &mut ShellContext<'_>) -> Result<String> {
    if !ctx.is_interactive() {
        bail!("ERROR: opencase requires a description.");
    }
    writeln!(ctx.out, "{DESCRIPTION_PROMPT}")?;
    let mut lines = Vec::new();
    while let Some(line) = ctx.read_line("")? {
        if line.trim() == "." {
            break;
        }
        lines.push(line);
    }
    let description = lines.join("\n").trim().to_string();
    if description.is_empty() {
        bail!("ERROR: Invalid description.");
    }
    Ok(description)
}

/// Outer `None` means quit; inner `None` leaves the severity to the service.
fn pick_severity(
    ctx: &mut ShellContext<'_>,
    given: Option<&str>,
) -> Result<Option<Option<String>>> {
    let severities = ctx.service.list_values(CaseField::Severity)?;
    if let Some(given) = given {
        let Some(severity) = find_containing(&severities, given.trim()) else {
            bail!("ERROR: Invalid severity specified.");
        };
        return Ok(Some(Some(severity.clone())));
    }
    if !ctx.is_interactive() || severities.is_empty() {
        return Ok(Some(None));
    }
    let names: Vec<String> = severities
        .iter()
        .map(|severity| severity_name(severity).to_string())
        .collect();
    Ok(select_index(ctx, "severity", &names)?.map(|index| Some(severities[index].clone())))
}

/// Outer `None` means quit; inner `None` opens the case outside any group.
fn pick_group(
    ctx: &mut ShellContext<'_>,
    given: Option<&str>,
) -> Result<Option<Option<String>>> {
    let groups = ctx.service.list_groups()?;
    if let Some(given) = given {
        let given = given.trim().to_lowercase();
        let Some(group) = groups
            .iter()
            .find(|group| group.name.to_lowercase().contains(&given))
        else {
            bail!("ERROR: Invalid case group specified.");
        };
        log_debug(&format!("case group {} ({})", group.name, group.number));
        return Ok(Some(Some(group.number.clone())));
    }
    if !ctx.is_interactive()
        || groups.is_empty()
        || !confirm(
            ctx,
            "Would you like to assign a case group to this case (y/N)? ",
            false,
        )?
    {
        return Ok(Some(None));
    }
    let names: Vec<String> = groups.iter().map(|group| group.name.clone()).collect();
    Ok(select_index(ctx, "case group", &names)?.map(|index| Some(groups[index].number.clone())))
}

/// Offer a solution search on the summary first. False when the user backs out.
fn still_wanted(ctx: &mut ShellContext<'_>, summary: &str) -> Result<bool> {
    if !confirm(
        ctx,
        "Would you like to see if there is a solution to this problem before opening a support case? (y/N) ",
        false,
    )? {
        return Ok(true);
    }
    let keywords: Vec<String> = summary.split_whitespace().map(str::to_string).collect();
    if let Err(err) = ctx.launch("search", &keywords) {
        writeln!(ctx.out, "{err:#}")?;
    }
    confirm(ctx, "Would you still like to open the support case? (Y/n) ", true)
}

fn file_label(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, temp_dir, TestShell};
    use std::fs;

    fn run(shell: &TestShell, mode: RunMode, input: &str, args: &[&str]) -> (Result<()>, String) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        shell.run(mode, input, |ctx| ctx.launch("opencase", &args))
    }

    const FULL: [&str; 8] = [
        "-s",
        "Disk full",
        "-p",
        "linux",
        "-v",
        "9.2",
        "-d",
        "The root volume filled up.",
    ];

    #[test]
    fn batch_opens_a_case_from_flags() {
        let shell = TestShell::new(sample_snapshot());
        let mut args = FULL.to_vec();
        args.extend(["-S", "urgent", "-g", "web"]);
        let (result, out) = run(&shell, RunMode::Batch, "", &args);
        result.expect("opencase");
        assert!(out.contains("Support case 00000003 has successfully been opened.\n\n"));
        assert!(out.contains("support-tool addattachment -c 00000003 <path to sosreport>"));

        let case = shell.service.get_case("00000003").expect("case");
        assert_eq!(case.product, "Linux");
        assert_eq!(case.version, "9.2");
        assert_eq!(case.severity, "1 (Urgent)");
        assert_eq!(case.group_number.as_deref(), Some("42"));
        assert_eq!(case.description.as_deref(), Some("The root volume filled up."));
    }

    #[test]
    fn invalid_values_are_rejected_before_anything_is_created() {
        let shell = TestShell::new(sample_snapshot());
        let cases = [
            (vec!["-p", "Mainframe"], INVALID_PRODUCT),
            (vec!["-p", "Linux", "-v", "7"], "ERROR: Invalid version provided."),
            (vec!["-p", "Linux", "-v", "9.2"], "ERROR: opencase requires a summary."),
        ];
        for (args, message) in cases {
            let (result, _) = run(&shell, RunMode::Batch, "", &args);
            assert_eq!(result.expect_err(message).to_string(), message);
        }
        let mut args = FULL.to_vec();
        args.extend(["-S", "catastrophic"]);
        let (result, _) = run(&shell, RunMode::Batch, "", &args);
        assert_eq!(
            result.expect_err("severity").to_string(),
            "ERROR: Invalid severity specified."
        );
        assert!(shell.service.get_case("00000003").is_err());
    }

    #[test]
    fn interactive_walks_through_every_choice() {
        let shell = TestShell::new(sample_snapshot());
        let input = "2\n1\nVM will not start\nThe guest hangs at boot.\nSecond line.\n.\n2\ny\n1\nn\nn\n";
        let (result, out) = run(&shell, RunMode::Interactive, input, &[]);
        result.expect("opencase");
        assert!(out.contains(" 1   Linux\n 2   Virtualization\n"));
        assert!(out.contains(" 1   Urgent\n"));
        assert!(out.contains("Would you like to attach a file to 00000003 at this time? (y/N) "));

        let case = shell.service.get_case("00000003").expect("case");
        assert_eq!(case.product, "Virtualization");
        assert_eq!(case.version, "4.4");
        assert_eq!(case.severity, "2 (High)");
        assert_eq!(case.group_number.as_deref(), Some("42"));
        assert_eq!(
            case.description.as_deref(),
            Some("The guest hangs at boot.\nSecond line.")
        );
    }

    #[test]
    fn declining_after_the_solution_search_opens_nothing() {
        let shell = TestShell::new(sample_snapshot());
        let args = [
            "-s", "Kernel panic", "-p", "Linux", "-v", "8.9", "-d", "Panics on boot.", "-S",
            "normal", "-g", "web",
        ];
        let (result, out) = run(&shell, RunMode::Interactive, "y\ne\nn\n", &args);
        result.expect("opencase");
        assert!(out.contains("Kernel panic after update"));
        assert!(out.contains("Thank you for using the Support Tool"));
        assert!(shell.service.get_case("00000003").is_err());
    }

    #[test]
    fn quitting_a_selection_opens_nothing() {
        let shell = TestShell::new(sample_snapshot());
        let (result, _) = run(&shell, RunMode::Interactive, "q\n", &[]);
        result.expect("quit");
        assert!(shell.service.get_case("00000003").is_err());
    }

    #[test]
    fn attachment_flag_uploads_to_the_new_case() {
        let dir = temp_dir("opencase-attach");
        let file = dir.join("sosreport.tar.xz");
        fs::write(&file, "tarball").expect("write");
        let shell = TestShell::new(sample_snapshot());
        let mut args = FULL.to_vec();
        let raw = file.to_string_lossy().into_owned();
        args.extend(["-a", raw.as_str()]);
        let (result, out) = run(&shell, RunMode::Batch, "", &args);
        result.expect("opencase");
        assert!(out.contains("Uploading sosreport.tar.xz to the case ... completed successfully."));
        let listed = shell.service.list_attachments("00000003").expect("list");
        assert_eq!(listed[0].description.as_deref(), Some("File sosreport.tar.xz"));
        let _ = fs::remove_dir_all(dir);
    }
}
