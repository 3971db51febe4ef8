//! `search`: paged knowledge base search.

use super::{record_separator, require_value};
use crate::config::DEFAULT_SEARCH_MAX_RESULTS;
use crate::console::Style;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::log_debug_content;
use crate::menu::{DisplayItem, MenuEngine, MenuText, PagedFeed, ResultProvider};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{ServiceError, ServiceHandle, Solution};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use regex::Regex;
use std::rc::Rc;
use std::sync::OnceLock;

const SUMMARY: &str = "Use the 'search' command to search the entire knowledge base for solutions with given keywords, a log message, program configuration variables, etc.";
const INTRO: &str =
    "\nType the number of the solution to view or 'e' to return to the previous menu.";
const PROMPT: &str = "Select a Solution: ";
const PARTIAL: &str = "{shown} of {total} solutions displayed. Type 'm' to see more, 'r' to start from the beginning again, or '?' for help with the codes displayed in the above output.";
const MORE_MAYBE: &str = "More solutions may be available. Type 'm' to try and find more";
const END: &str = "No more solutions to display";

/// Knowledge states by their three letter code.
const STATE_LEGEND: &[(&str, &str)] = &[
    ("WIP", "Work In Progress: This solution is a Work in Progress."),
    (
        "UNV",
        "Unverified: This solution has not yet been verified to work by customers.",
    ),
    (
        "VER",
        "Verified: This solution has been verified to work by customers and support engineers for the specified product version(s).",
    ),
];

#[derive(Debug, Parser)]
#[command(
    name = "search",
    about = SUMMARY,
    after_help = "Examples:\n  - search RHEV\n  - search -s Starting osa-dispatcher: RHN 9899 Traceback caught"
)]
struct SearchArgs {
    /// Display summary information about matched articles
    #[arg(short = 's', long = "summary")]
    summary: bool,

    /// Keywords, a log message, configuration variables, etc.
    #[arg(value_name = "KEYWORDS", num_args = 0..)]
    keywords: Vec<String>,
}

pub struct SearchPlugin;

impl Plugin for SearchPlugin {
    fn name(&self) -> &str {
        "search"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        SearchArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<SearchArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let given = (!args.keywords.is_empty()).then(|| args.keywords.join(" "));
        let Some(query) = require_value(
            ctx,
            given,
            "Please provide the text to search (or 'q' to exit): ",
            "ERROR: search requires text to search.",
        )?
        else {
            return Ok(());
        };
        log_debug_content(&format!("search query: {query}"));

        let limits = ctx.settings.page_limits(DEFAULT_SEARCH_MAX_RESULTS);
        let provider = SolutionProvider {
            service: Rc::clone(&ctx.service),
            query,
        };
        let labels = LabelStyle {
            ponies: ctx.settings.ponies,
            summary: args.summary,
        };
        let feed = PagedFeed::new(provider, limits, move |solution: Solution| {
            DisplayItem::with_payload(labels.label(&solution), (), solution)
        });
        let text = MenuText::default()
            .with_intro(INTRO)
            .with_prompt(PROMPT)
            .with_partial(PARTIAL)
            .with_more_maybe(MORE_MAYBE)
            .with_end(END);
        let mut engine = MenuEngine::with_feed(text, Box::new(feed));
        if engine.prime(limits.limit)? == 0 {
            bail!("Unable to find solutions");
        }
        let host = SearchHost {
            style: ctx.style,
            summary: args.summary,
        };
        MenuSession::new(engine, host).run(ctx)
    }
}

struct SolutionProvider {
    service: ServiceHandle,
    query: String,
}

impl ResultProvider for SolutionProvider {
    type Item = Solution;

    fn fetch(&mut self, offset: usize, count: usize) -> Result<Vec<Solution>, ServiceError> {
        self.service.search_solutions(&self.query, offset, count)
    }
}

/// First three letters of the knowledge state, upper-cased.
fn state_code(solution: &Solution) -> String {
    solution.state.chars().take(3).collect::<String>().to_uppercase()
}

fn state_explanation(code: &str) -> &'static str {
    STATE_LEGEND
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, text)| *text)
        .unwrap_or_default()
}

/// Issue text on one line, whitespace collapsed.
fn abstract_text(solution: &Solution) -> String {
    solution
        .issue
        .as_deref()
        .map(|issue| issue.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Browser link for a solution. API links lose their `api.` host prefix and `/rs` path.
pub(crate) fn solution_url(solution: &Solution) -> String {
    if let Some(view_uri) = solution.view_uri.as_deref().filter(|uri| !uri.is_empty()) {
        return view_uri.to_string();
    }
    static API_PARTS: OnceLock<Option<Regex>> = OnceLock::new();
    match API_PARTS.get_or_init(|| Regex::new(r"api\.|/rs").ok()) {
        Some(pattern) => pattern.replace_all(&solution.uri, "").into_owned(),
        None => solution.uri.clone(),
    }
}

#[derive(Debug, Clone, Copy)]
struct LabelStyle {
    ponies: bool,
    summary: bool,
}

impl LabelStyle {
    fn label(&self, solution: &Solution) -> String {
        let code = state_code(solution);
        let mut label = if self.ponies {
            let moderation = solution
                .moderation_state
                .as_deref()
                .and_then(|state| state.chars().next())
                .map(|ch| ch.to_ascii_uppercase().to_string())
                .unwrap_or_default();
            format!("[{:>7}:{code}:{moderation}] {}", solution.id, solution.title)
        } else {
            format!("[{:>7}:{code}] {}", solution.id, solution.title)
        };
        if self.summary {
            label.push_str(&format!(" *** Summary: {}", abstract_text(solution)));
        }
        label
    }
}

struct SearchHost {
    style: Style,
    summary: bool,
}

impl SearchHost {
    fn record(&self, solution: &Solution) -> String {
        let mut doc = format!("{:<8} {}\n", "Title:", solution.title);
        if self.summary {
            doc.push_str(&format!("{:<8} {}\n", "Summary:", abstract_text(solution)));
        }
        doc.push_str(&format!("{:<8} {}\n", "ID:", solution.id));
        doc.push_str(&format!(
            "State:   {}\n",
            state_explanation(&state_code(solution))
        ));
        doc.push_str(&format!("{:<8} {}", "URL:", solution_url(solution)));
        doc.push_str(&record_separator(self.style));
        doc
    }
}

impl MenuHost for SearchHost {
    type Action = ();
    type Payload = Solution;

    fn invoke(
        &mut self,
        item: &DisplayItem<(), Solution>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), Solution>> {
        if let Some(solution) = &item.payload {
            ctx.launch("kb", &[solution.id.clone()])?;
        }
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), Solution>]) -> String {
        items
            .iter()
            .filter_map(|item| item.payload.as_ref())
            .map(|solution| self.record(solution))
            .collect()
    }

    fn help_preamble(&self) -> Option<String> {
        let mut text = String::from(
            "Support assigns a state to every knowledge solution, which is displayed in the above output.\n\nThe current states are:\n",
        );
        for (code, explanation) in STATE_LEGEND {
            text.push_str(&format!("  {code} - {explanation}\n"));
        }
        Some(text)
    }

    fn help_is_options(&self) -> bool {
        false
    }
}
