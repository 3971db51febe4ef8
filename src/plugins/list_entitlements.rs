//! `listentitlements`: support entitlements on the account.

use super::record_separator;
use crate::console::Style;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::Entitlement;
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'listentitlements' command to list your current entitlements.";
const INTRO: &str =
    "\nType the number of the entitlement to view or 'e' to return to the previous menu.";
const PROMPT: &str = "Select an entitlement: ";

#[derive(Debug, Parser)]
#[command(
    name = "listentitlements",
    about = SUMMARY,
    after_help = "Example:\n  - listentitlements"
)]
struct ListEntitlementsArgs {}

pub struct ListEntitlementsPlugin;

impl Plugin for ListEntitlementsPlugin {
    fn name(&self) -> &str {
        "listentitlements"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ListEntitlementsArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        if parse_args::<ListEntitlementsArgs>(ctx, self.command(), args)?.is_none() {
            return Ok(());
        }
        let entitlements = ctx.service.list_entitlements()?;
        if entitlements.is_empty() {
            bail!("No entitlements found.");
        }
        let style = ctx.style;
        let items = entitlements
            .iter()
            .map(|entitlement| {
                DisplayItem::with_payload(entitlement.name.clone(), (), record(entitlement, style))
            })
            .collect();
        let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
        MenuSession::new(MenuEngine::new(text, items), EntitlementHost).run(ctx)
    }
}

fn record(entitlement: &Entitlement, style: Style) -> String {
    let field = |label: &str, value: &str| format!("{label:<15}  {value}\n");
    let mut doc = String::new();
    doc.push_str(&field("Name:", &entitlement.name));
    doc.push_str(&field("Service Level:", &entitlement.service_level));
    doc.push_str(&field("SLA:", &entitlement.sla));
    doc.push_str(&field("Support Level:", &entitlement.support_level));
    doc.push_str(&field("Start Date:", &entitlement.start_date));
    doc.push_str(&format!("{:<15}  {}", "End Date:", entitlement.end_date));
    doc.push_str(&record_separator(style));
    doc
}

struct EntitlementHost;

impl MenuHost for EntitlementHost {
    type Action = ();
    type Payload = String;

    fn invoke(
        &mut self,
        item: &DisplayItem<(), String>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), String>> {
        if let Some(doc) = &item.payload {
            ctx.page(doc)?;
        }
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), String>]) -> String {
        items.iter().filter_map(|item| item.payload.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Snapshot;
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, TestShell};

    #[test]
    fn batch_prints_every_record() {
        let mut snapshot = sample_snapshot();
        snapshot.entitlements.push(Entitlement {
            name: "Developer Subscription".to_string(),
            service_level: "SELF-SUPPORT".to_string(),
            sla: "None".to_string(),
            support_level: "None".to_string(),
            start_date: "2024-02-01".to_string(),
            end_date: "2025-02-01".to_string(),
        });
        let shell = TestShell::new(snapshot);
        let (result, out) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listentitlements", &[])
        });
        result.expect("listentitlements");
        assert!(out.starts_with("Name:            Premium Server Subscription\n"));
        assert!(out.contains("SLA:             24x7\n"));
        assert!(out.contains("End Date:        2025-01-01\n\n"));
        assert!(out.contains("Name:            Developer Subscription\n"));
        assert_eq!(out.matches(&"-".repeat(79)).count(), 2);
    }

    #[test]
    fn selecting_an_entitlement_shows_its_record() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = shell.run(RunMode::Interactive, "1\ne\n", |ctx| {
            ctx.launch("listentitlements", &[])
        });
        result.expect("listentitlements");
        assert!(out.contains(" 1 Premium Server Subscription"));
        assert!(out.contains("Support Level:   L1-L3\n"));
        assert!(out.contains(PROMPT));
    }

    #[test]
    fn account_without_entitlements_is_an_error() {
        let shell = TestShell::new(Snapshot::default());
        let (result, _) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listentitlements", &[])
        });
        assert_eq!(result.expect_err("empty").to_string(), "No entitlements found.");
    }
}
