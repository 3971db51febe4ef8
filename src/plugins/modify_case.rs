//! `modifycase`: change the type, severity, status, alternative id, product or
//! version of a case, from flags or through a menu of attributes.

use super::list_versions::INVALID_PRODUCT;
use super::{find_containing, find_exact, require_value, select_index, severity_name};
use crate::dispatch::{ActionOutcome, MenuHost, MenuSession};
use crate::log_debug;
use crate::menu::{DisplayItem, MenuEngine, MenuText};
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{Case, CaseField, CaseUpdate, Product, ServiceHandle};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'modifycase' command to modify a specific case by number.";
const INTRO: &str =
    "\nType the number of the attribute to modify or 'e' to return to the previous menu.";
const PROMPT: &str = "Selection: ";
const INVALID_VERSION: &str = "ERROR: Invalid version provided.";

#[derive(Debug, Parser)]
#[command(
    name = "modifycase",
    about = SUMMARY,
    after_help = "Examples:\n  - modifycase <case number>\n  - modifycase -s Closed <case number>"
)]
struct ModifyCaseArgs {
    /// The type of case
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    case_type: Option<String>,

    /// The severity for the case
    #[arg(short = 'S', long = "severity", value_name = "SEVERITY")]
    severity: Option<String>,

    /// The status for the case
    #[arg(short = 's', long = "status", value_name = "STATUS")]
    status: Option<String>,

    /// An alternative-id for the case
    #[arg(short = 'a', long = "alternative-id", value_name = "ID")]
    alternate_id: Option<String>,

    /// The product the case is opened against
    #[arg(short = 'p', long = "product", value_name = "PRODUCT")]
    product: Option<String>,

    /// The version of the product the case is opened against
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    version: Option<String>,

    /// Case number
    #[arg(value_name = "CASENUMBER", num_args = 0..)]
    case_number: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Type,
    Severity,
    Status,
    AlternateId,
    Product,
    Version,
}

impl Attribute {
    const ALL: [Attribute; 6] = [
        Attribute::Type,
        Attribute::Severity,
        Attribute::Status,
        Attribute::AlternateId,
        Attribute::Product,
        Attribute::Version,
    ];

    fn title(self) -> &'static str {
        match self {
            Attribute::Type => "Modify Type",
            Attribute::Severity => "Modify Severity",
            Attribute::Status => "Modify Status",
            Attribute::AlternateId => "Modify Alternative-ID",
            Attribute::Product => "Modify Product",
            Attribute::Version => "Modify Version",
        }
    }
}

pub struct ModifyCasePlugin;

impl Plugin for ModifyCasePlugin {
    fn name(&self) -> &str {
        "modifycase"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ModifyCaseArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ModifyCaseArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let given = (!args.case_number.is_empty()).then(|| args.case_number.join(" "));
        let Some(case_number) = require_value(
            ctx,
            given,
            "Please provide a case number (or 'q' to exit): ",
            "ERROR: modifycase requires a case number.",
        )?
        else {
            return Ok(());
        };

        let update = validated_update(&ctx.service, &args)?;
        let case = ctx.service.get_case(&case_number)?;
        if let Some(version) = &update.version {
            let product = update.product.as_deref().unwrap_or(&case.product);
            if find_exact(&product_versions(&ctx.service, product)?, version).is_none() {
                bail!("{INVALID_VERSION}");
            }
        }

        if !update.is_empty() {
            ctx.service.update_case(&case_number, &update)?;
            log_debug(&format!("updated case {case_number}: {update:?}"));
            writeln!(ctx.out, "Successfully updated case {case_number}")?;
            return Ok(());
        }
        if !ctx.is_interactive() {
            bail!("ERROR: modifycase requires at least one attribute to change.");
        }

        let items = Attribute::ALL
            .into_iter()
            .map(|attribute| DisplayItem::new(attribute.title(), attribute))
            .collect();
        let text = MenuText::default().with_intro(INTRO).with_prompt(PROMPT);
        MenuSession::new(MenuEngine::new(text, items), ModifyHost { case }).run(ctx)
    }
}

/// Check the flag values against the service's allowed values and normalise
/// their spelling. Versions are checked later, once the case's product is known.
fn validated_update(service: &ServiceHandle, args: &ModifyCaseArgs) -> Result<CaseUpdate> {
    let mut update = CaseUpdate {
        alternate_id: args.alternate_id.clone(),
        version: args.version.clone(),
        ..CaseUpdate::default()
    };
    if let Some(given) = &args.case_type {
        let types = service.list_values(CaseField::Type)?;
        let Some(case_type) = find_exact(&types, given) else {
            bail!("ERROR: Invalid type specified.");
        };
        update.case_type = Some(case_type.clone());
    }
    if let Some(given) = &args.severity {
        let severities = service.list_values(CaseField::Severity)?;
        let Some(severity) = find_containing(&severities, given) else {
            bail!("ERROR: Invalid severity specified.");
        };
        update.severity = Some(severity.clone());
    }
    if let Some(given) = &args.status {
        let statuses = service.list_values(CaseField::Status)?;
        let Some(status) = find_exact(&statuses, given) else {
            bail!("ERROR: Invalid status specified.");
        };
        update.status = Some(status.clone());
    }
    if let Some(given) = &args.product {
        let products = service.list_products()?;
        let Some(product) = products
            .iter()
            .find(|product| product.name.eq_ignore_ascii_case(given))
        else {
            bail!("{INVALID_PRODUCT}");
        };
        update.product = Some(product.name.clone());
    }
    Ok(update)
}

fn product_versions(service: &ServiceHandle, product: &str) -> Result<Vec<String>> {
    Ok(service
        .list_products()?
        .into_iter()
        .find(|candidate| candidate.name == product)
        .map(|found| found.versions)
        .unwrap_or_default())
}

struct ModifyHost {
    case: Case,
}

impl ModifyHost {
    /// Prompt for one attribute. `None` when the user quits the prompt.
    fn prompt(
        &self,
        attribute: Attribute,
        ctx: &mut ShellContext<'_>,
    ) -> Result<Option<CaseUpdate>> {
        let update = match attribute {
            Attribute::Type => pick_value(ctx, CaseField::Type)?.map(|value| CaseUpdate {
                case_type: Some(value),
                ..CaseUpdate::default()
            }),
            Attribute::Severity => pick_value(ctx, CaseField::Severity)?.map(|value| CaseUpdate {
                severity: Some(value),
                ..CaseUpdate::default()
            }),
            Attribute::Status => pick_value(ctx, CaseField::Status)?.map(|value| CaseUpdate {
                status: Some(value),
                ..CaseUpdate::default()
            }),
            Attribute::AlternateId => require_value(
                ctx,
                None,
                "Please provide a alternative-id (or 'q' to exit): ",
                "ERROR: Invalid alternative-id provided.",
            )?
            .map(|value| CaseUpdate {
                alternate_id: Some(value),
                ..CaseUpdate::default()
            }),
            Attribute::Product => self.pick_product(ctx)?,
            Attribute::Version => {
                let versions = product_versions(&ctx.service, &self.case.product)?;
                pick_version(ctx, &versions)?.map(|value| CaseUpdate {
                    version: Some(value),
                    ..CaseUpdate::default()
                })
            }
        };
        Ok(update)
    }

    /// A new product also needs a version of that product.
    fn pick_product(&self, ctx: &mut ShellContext<'_>) -> Result<Option<CaseUpdate>> {
        let products: Vec<Product> = ctx.service.list_products()?;
        let names: Vec<String> = products.iter().map(|product| product.name.clone()).collect();
        let Some(index) = select_index(ctx, "product", &names)? else {
            return Ok(None);
        };
        let product = &products[index];
        let mut update = CaseUpdate {
            product: Some(product.name.clone()),
            ..CaseUpdate::default()
        };
        if product.name != self.case.product {
            let Some(version) = pick_version(ctx, &product.versions)? else {
                return Ok(None);
            };
            update.version = Some(version);
        }
        Ok(Some(update))
    }
}

fn pick_value(ctx: &mut ShellContext<'_>, field: CaseField) -> Result<Option<String>> {
    let values = ctx.service.list_values(field)?;
    let labels: Vec<String> = match field {
        CaseField::Severity => values
            .iter()
            .map(|value| severity_name(value).to_string())
            .collect(),
        CaseField::Type | CaseField::Status => values.clone(),
    };
    Ok(select_index(ctx, field.noun(), &labels)?.map(|index| values[index].clone()))
}

fn pick_version(ctx: &mut ShellContext<'_>, versions: &[String]) -> Result<Option<String>> {
    if versions.is_empty() {
        bail!("{INVALID_VERSION}");
    }
    Ok(select_index(ctx, "version", versions)?.map(|index| versions[index].clone()))
}

impl MenuHost for ModifyHost {
    type Action = Attribute;
    type Payload = ();

    fn invoke(
        &mut self,
        item: &DisplayItem<Attribute>,
        ctx: &mut ShellContext<'_>,
    ) -> Result<ActionOutcome<Attribute, ()>> {
        let Some(update) = self.prompt(item.action, ctx)? else {
            return Ok(ActionOutcome::Continue);
        };
        self.case = ctx.service.update_case(&self.case.case_number, &update)?;
        log_debug(&format!("updated case {}: {update:?}", self.case.case_number));
        writeln!(ctx.out, "Successfully updated case {}", self.case.case_number)?;
        Ok(ActionOutcome::Continue)
    }

    fn batch_output(&self, items: &[DisplayItem<Attribute>]) -> String {
        items.iter().map(|item| format!("{}\n", item.label)).collect()
    }
}
