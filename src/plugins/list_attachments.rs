//! `listattachments`: attachments on one case.

use super::{friendly_size, record_separator, require_value};
use crate::console::Style;
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::Attachment;
use anyhow::Result;
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'listattachments' command to list attachments for the specified support case.";
const INTRO: &str =
    "\nType the number of the attachment to download or 'e' to return to the previous menu.";
const PROMPT: &str = "Select an attachment: ";

#[derive(Debug, Parser)]
#[command(
    name = "listattachments",
    about = SUMMARY,
    after_help = "Example:\n  - listattachments <case number>"
)]
struct ListAttachmentsArgs {
    /// Case number
    #[arg(value_name = "CASENUMBER")]
    case_number: Option<String>,
}

pub struct ListAttachmentsPlugin;

impl Plugin for ListAttachmentsPlugin {
    fn name(&self) -> &str {
        "listattachments"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ListAttachmentsArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ListAttachmentsArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let Some(case_number) = require_value(
            ctx,
            args.case_number,
            "Please provide the case number (or 'q' to exit): ",
            "ERROR: listattachments requires a case number.",
        )?
        else {
            return Ok(());
        };

        let attachments = ctx.service.list_attachments(&case_number)?;
        if attachments.is_empty() {
            writeln!(ctx.out, "No attachments found on case {case_number}")?;
            return Ok(());
        }
        let items = attachments.into_iter().map(attachment_item).collect();
        let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
        let host = AttachmentListHost {
            case_number,
            style: ctx.style,
        };
        MenuSession::new(MenuEngine::new(text, items), host).run(ctx)
    }
}

fn attachment_item(attachment: Attachment) -> DisplayItem<(), Attachment> {
    let label = format!(
        "{:<24}  {:<40}  {}",
        attachment.file_name,
        attachment.uuid,
        attachment.description.as_deref().unwrap_or_default()
    );
    DisplayItem::with_payload(label.trim_end(), (), attachment)
}

struct AttachmentListHost {
    case_number: String,
    style: Style,
}

impl AttachmentListHost {
    fn record(&self, attachment: &Attachment) -> String {
        let field = |label: &str, value: &str| format!("{label:<14}  {value}\n");
        let mut doc = String::new();
        doc.push_str(&field("Date:", &attachment.created_date));
        doc.push_str(&field("Created By:", &attachment.created_by));
        doc.push_str(&field("File Name:", &attachment.file_name));
        doc.push_str(&field(
            "Description:",
            attachment.description.as_deref().unwrap_or_default(),
        ));
        doc.push_str(&field("Length:", &friendly_size(attachment.length)));
        doc.push_str(&format!("{:<14}  {}", "UUID:", attachment.uuid));
        doc.push_str(&record_separator(self.style));
        doc
    }
}

impl MenuHost for AttachmentListHost {
    type Action = ();
    type Payload = Attachment;

    fn invoke(
        &mut self,
        item: &DisplayItem<(), Attachment>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<(), Attachment>> {
        if let Some(attachment) = &item.payload {
            let args = [
                "-c".to_string(),
                self.case_number.clone(),
                "-u".to_string(),
                attachment.uuid.clone(),
            ];
            ctx.launch("getattachment", &args)?;
        }
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<(), Attachment>]) -> String {
        items
            .iter()
            .filter_map(|item| item.payload.as_ref())
            .map(|attachment| self.record(attachment))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::RunMode;
    use crate::test_support::{sample_snapshot, TestShell};

    #[test]
    fn batch_prints_attachment_records() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listattachments", &["00000001".to_string()])
        });
        result.expect("listattachments");
        assert!(out.contains(&format!("{:<14}  sosreport.txt", "File Name:")));
        assert!(out.contains(&format!("{:<14}  11 bytes", "Length:")));
        assert!(out.contains(&format!("{:<14}  uuid-1", "UUID:")));
    }

    #[test]
    fn case_without_attachments_says_so() {
        let shell = TestShell::new(sample_snapshot());
        let (result, out) = shell.run(RunMode::Batch, "", |ctx| {
            ctx.launch("listattachments", &["00000002".to_string()])
        });
        result.expect("listattachments");
        assert_eq!(out, "No attachments found on case 00000002\n");
    }

    #[test]
    fn labels_align_name_and_uuid() {
        let shell = TestShell::new(sample_snapshot());
        let attachment = shell
            .service
            .list_attachments("00000001")
            .expect("list")
            .remove(0);
        let item = attachment_item(attachment);
        assert_eq!(
            item.label,
            format!("{:<24}  {:<40}  sosreport", "sosreport.txt", "uuid-1")
        );
    }

    #[test]
    fn selecting_an_attachment_downloads_it() {
        let shell = TestShell::new(sample_snapshot());
        let dir = crate::test_support::temp_dir("listattachments");
        let input = format!("1\n{}\ne\n", dir.display());
        let (result, out) = shell.run(RunMode::Interactive, &input, |ctx| {
            ctx.launch("listattachments", &["00000001".to_string()])
        });
        result.expect("listattachments");
        assert!(out.contains("Select an attachment: "));
        assert!(out.contains("File downloaded to"));
        assert_eq!(
            std::fs::read_to_string(dir.join("sosreport.txt")).expect("downloaded"),
            "hello world"
        );
        let _ = std::fs::remove_dir_all(dir);
    }
}
