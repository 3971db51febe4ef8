//! `getcase`: one case broken into viewable sections.

use super::{record_separator, require_value, section_header};
use crate::console::Style;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::log_debug;
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{Case, ServiceHandle};
use anyhow::Result;
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'getcase' command to find a specific case by number.";
const INTRO: &str =
    "\nType the number of the section to view or 'e' to return to the previous menu.";
const PROMPT: &str = "Option: ";

#[derive(Debug, Parser)]
#[command(
    name = "getcase",
    about = SUMMARY,
    after_help = "Example:\n  - getcase <case number>"
)]
struct GetCaseArgs {
    /// Case number
    #[arg(value_name = "CASENUMBER", num_args = 0..)]
    case_number: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaseSection {
    Details,
    Description,
    Discussion,
    GetAttachment,
    AddComment,
}

impl CaseSection {
    fn title(self) -> &'static str {
        match self {
            CaseSection::Details => "Case Details",
            CaseSection::Description => "Description",
            CaseSection::Discussion => "Case Discussion",
            CaseSection::GetAttachment => "Get Attachments",
            CaseSection::AddComment => "Add Comment",
        }
    }

    /// Sections that render as a document rather than launching a command.
    fn is_document(self) -> bool {
        matches!(
            self,
            CaseSection::Details | CaseSection::Description | CaseSection::Discussion
        )
    }
}

pub struct GetCasePlugin;

impl Plugin for GetCasePlugin {
    fn name(&self) -> &str {
        "getcase"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        GetCaseArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<GetCaseArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let given = (!args.case_number.is_empty()).then(|| args.case_number.join(" "));
        let Some(case_number) = require_value(
            ctx,
            given,
            "Please provide a case number (or 'q' to exit): ",
            "ERROR: getcase requires a case number.",
        )?
        else {
            return Ok(());
        };

        let view = CaseView::load(&ctx.service, &case_number)?;
        let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
        let engine = MenuEngine::new(text, view.sections());
        let host = CaseHost {
            view,
            style: ctx.style,
        };
        MenuSession::new(engine, host).run(ctx)
    }
}

/// A loaded case plus the name of its group, if it has one.
pub(crate) struct CaseView {
    case: Case,
    group_name: Option<String>,
}

impl CaseView {
    fn load(service: &ServiceHandle, case_number: &str) -> Result<Self> {
        let case = service.get_case(case_number)?;
        let group_name = match case.group_number.as_deref() {
            Some(number) => service
                .list_groups()?
                .into_iter()
                .find(|group| group.number == number)
                .map(|group| group.name),
            None => None,
        };
        Ok(Self { case, group_name })
    }

    /// Menu entries available for this case. Empty sections are left out.
    fn sections(&self) -> Vec<DisplayItem<CaseSection>> {
        let mut sections = vec![CaseSection::Details];
        if self.case.description.is_some() {
            sections.push(CaseSection::Description);
        }
        if !self.case.comments.is_empty() {
            sections.push(CaseSection::Discussion);
        }
        sections.push(CaseSection::GetAttachment);
        sections.push(CaseSection::AddComment);
        sections
            .into_iter()
            .map(|section| DisplayItem::new(section.title(), section))
            .collect()
    }

    fn document(&self, section: CaseSection, style: Style) -> Option<String> {
        match section {
            CaseSection::Details => Some(self.details(style)),
            CaseSection::Description => self
                .case
                .description
                .as_ref()
                .map(|text| format!("{}{text}\n", section_header(style, section.title()))),
            CaseSection::Discussion => Some(self.discussion(style)),
            CaseSection::GetAttachment | CaseSection::AddComment => None,
        }
    }

    fn details(&self, style: Style) -> String {
        let case = &self.case;
        let field = |label: &str, value: &str| format!("{label:<20}  {value}\n");
        let mut doc = section_header(style, CaseSection::Details.title());
        doc.push_str(&field("Case Number:", &case.case_number));
        doc.push_str(&field("Case Type:", &case.case_type));
        doc.push_str(&field("Severity:", &case.severity));
        doc.push_str(&field("Status:", &case.status));
        doc.push_str(&field(
            "Alternate ID:",
            case.alternate_id.as_deref().unwrap_or("None"),
        ));
        doc.push('\n');
        doc.push_str(&field("Product:", &case.product));
        doc.push_str(&field("Version:", &case.version));
        doc.push_str(&field("Owner:", &case.contact_name));
        doc.push_str(&field("Support Owner:", &case.owner));
        doc.push('\n');
        doc.push_str(&field("Group:", self.group_name.as_deref().unwrap_or("None")));
        doc.push_str(&field("Opened:", &case.created_date));
        doc.push_str(&field("Opened By:", &case.created_by));
        doc.push_str(&field("Last Updated:", &case.last_modified_date));
        doc.push_str(&field("Last Updated By:", &case.last_modified_by));
        doc.push('\n');
        doc.push_str(&field("Summary:", &case.summary));
        doc.push('\n');
        doc
    }

    /// Comments newest first, numbered so the oldest is #1.
    fn discussion(&self, style: Style) -> String {
        let comments = &self.case.comments;
        let mut doc = section_header(style, CaseSection::Discussion.title());
        for (i, comment) in comments.iter().enumerate() {
            let visibility = if comment.public {
                "(public)".to_string()
            } else {
                style.bold("(private)")
            };
            doc.push_str(&format!(
                "{:<20}  #{} {visibility}\n",
                "Comment:",
                comments.len() - i
            ));
            doc.push_str(&format!("{:<20}  {}\n", "Author:", comment.created_by));
            doc.push_str(&format!("{:<20}  {}\n\n", "Date:", comment.created_date));
            doc.push_str(&comment.text);
            doc.push_str(&record_separator(style));
        }
        doc
    }
}

struct CaseHost {
    view: CaseView,
    style: Style,
}

impl MenuHost for CaseHost {
    type Action = CaseSection;
    type Payload = ();

    fn invoke(
        &mut self,
        item: &DisplayItem<CaseSection>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<CaseSection, ()>> {
        let case_number = self.view.case.case_number.clone();
        match item.action {
            CaseSection::GetAttachment => {
                ctx.launch("listattachments", &[case_number])?;
                Ok(ActionOutcome::Continue)
            }
            CaseSection::AddComment => {
                ctx.launch("addcomment", &["-c".to_string(), case_number.clone()])?;
                // A first comment adds the discussion section.
                if !self.view.case.comments.is_empty() {
                    return Ok(ActionOutcome::Continue);
                }
                log_debug(&format!("reloading case {case_number} after first comment"));
                self.view = CaseView::load(&ctx.service, &case_number)?;
                Ok(ActionOutcome::OptionsChanged(Some(self.view.sections())))
            }
            section => {
                if let Some(doc) = self.view.document(section, self.style) {
                    ctx.page(&doc)?;
                }
                Ok(ActionOutcome::Continue)
            }
        }
    }

    fn batch_output(&self, items: &[DisplayItem<CaseSection>]) -> String {
        items
            .iter()
            .filter(|item| item.action.is_document())
            .filter_map(|item| self.view.document(item.action, self.style))
            .collect()
    }
}
