//! `listcases`: paged listing of the account's support cases.

use super::record_separator;
use crate::config::DEFAULT_CASE_MAX_RESULTS;
use crate::console::Style;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::menu::{DisplayItem, MenuEngine, MenuText, PagedFeed, ResultProvider};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{Case, CaseFilter, ServiceError, ServiceHandle, SortField, SortOrder};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use std::rc::Rc;

const SUMMARY: &str = "Use the 'listcases' command to list your open support cases.";
const INTRO: &str = "\nType the number of the case to view or 'e' to return to the previous menu.";
const PROMPT: &str = "Select a Case: ";
const PARTIAL: &str = "{shown} of {total} cases displayed. Type 'm' to see more.";
const END: &str = "No more cases to display";

#[derive(Debug, Parser)]
#[command(
    name = "listcases",
    about = SUMMARY,
    after_help = "Examples:\n  - listcases\n  - listcases -c -g \"Web Team,42\" -s lastModifiedDate -a"
)]
struct ListCasesArgs {
    /// Include closed cases in the listing
    #[arg(short = 'c', long = "includeclosed")]
    include_closed: bool,

    /// Comma-separated case group names or numbers
    #[arg(short = 'g', long = "casegroup", value_name = "GROUPS")]
    case_group: Option<String>,

    /// Only list cases that belong to no case group
    #[arg(short = 'u', long = "ungrouped")]
    ungrouped: bool,

    /// Field to sort on (default caseNumber)
    #[arg(short = 's', long = "sortby", value_enum, value_name = "FIELD")]
    sort_by: Option<SortField>,

    /// Sort ascending instead of descending
    #[arg(short = 'a', long = "ascending")]
    ascending: bool,
}

pub struct ListCasesPlugin;

impl Plugin for ListCasesPlugin {
    fn name(&self) -> &str {
        "listcases"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ListCasesArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ListCasesArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let filter = build_filter(&ctx.service, &args)?;
        let limits = ctx.settings.page_limits(DEFAULT_CASE_MAX_RESULTS);
        let provider = CaseProvider {
            service: Rc::clone(&ctx.service),
            filter,
        };
        let feed = PagedFeed::new(provider, limits, case_item);
        let text = MenuText::default()
            .with_intro(INTRO)
            .with_prompt(PROMPT)
            .with_partial(PARTIAL)
            .with_end(END);
        let mut engine = MenuEngine::with_feed(text, Box::new(feed));
        if engine.prime(limits.limit)? == 0 {
            bail!("Unable to find cases");
        }
        let host = CaseListHost { style: ctx.style };
        MenuSession::new(engine, host).run(ctx)
    }
}

/// Turn `-g`/`-u`/`-s`/`-a` into a service filter. Group names are resolved to numbers.
fn build_filter(service: &ServiceHandle, args: &ListCasesArgs) -> Result<CaseFilter> {
    let mut group_numbers = Vec::new();
    if let Some(raw) = args.case_group.as_deref() {
        let groups = service.list_groups()?;
        for wanted in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            let found = groups.iter().find(|group| {
                group.number == wanted || group.name.eq_ignore_ascii_case(wanted)
            });
            match found {
                Some(group) => group_numbers.push(group.number.clone()),
                None => bail!("Unable to find case group {wanted}"),
            }
        }
    }
    Ok(CaseFilter {
        include_closed: args.include_closed,
        group_numbers,
        only_ungrouped: args.ungrouped,
        sort_field: args.sort_by.unwrap_or_default(),
        sort_order: if args.ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        },
    })
}

struct CaseProvider {
    service: ServiceHandle,
    filter: CaseFilter,
}

impl ResultProvider for CaseProvider {
    type Item = Case;

    fn fetch(&mut self, offset: usize, count: usize) -> Result<Vec<Case>, ServiceError> {
        self.service.list_cases(&self.filter, offset, count)
    }
}

fn case_item(case: Case) -> DisplayItem<(), Case> {
    let label = format!(
        "{} [{:<19}] [sev{}] {}",
        case.case_number,
        case.status,
        case.severity_level(),
        case.summary
    );
    DisplayItem::with_payload(label, (), case)
}

struct CaseListHost {
    style: Style,
}

impl CaseListHost {
    fn record(&self, case: &Case) -> String {
        let url = case.view_uri.as_deref().unwrap_or_default();
        let mut doc = String::new();
        doc.push_str(&format!("{:<12} {}\n", "Case Number:", case.case_number));
        doc.push_str(&format!("{:<12} {}\n", "Title:", case.summary));
        doc.push_str(&format!("{:<12} {}\n", "Status:", case.status));
        doc.push_str(&format!("{:<12} {}\n", "Severity:", case.severity));
        doc.push_str(&format!("{:<12} {}", "URL:", url));
        doc.push_str(&record_separator(self.style));
        doc
    }
}

impl MenuHost for CaseListHost {
    type Action = ();
    type Payload = Case;

    fn invoke(
        &mut self,
        item: &DisplayItem<(), Case>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), Case>> {
        if let Some(case) = &item.payload {
            ctx.launch("getcase", &[case.case_number.clone()])?;
        }
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), Case>]) -> String {
        items
            .iter()
            .filter_map(|item| item.payload.as_ref())
            .map(|case| self.record(case))
            .collect()
    }
}
