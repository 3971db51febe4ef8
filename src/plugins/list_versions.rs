//! `listversions`: versions of one product.

use super::require_value;
use crate::plugin::{parse_args, Plugin, ShellContext};
use crate::service::{Product, ServiceHandle};
use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};

const SUMMARY: &str = "Use the 'listversions' command to list versions of a product.";
pub(crate) const INVALID_PRODUCT: &str = "ERROR: Invalid product provided.";

#[derive(Debug, Parser)]
#[command(
    name = "listversions",
    about = SUMMARY,
    after_help = "Example:\n  - listversions Red Hat Enterprise Linux"
)]
struct ListVersionsArgs {
    /// Product name
    #[arg(value_name = "PRODUCT", num_args = 0..)]
    product: Vec<String>,
}

pub struct ListVersionsPlugin;

impl Plugin for ListVersionsPlugin {
    fn name(&self) -> &str {
        "listversions"
    }

    fn summary(&self) -> &str {
        SUMMARY
    }

    fn command(&self) -> clap::Command {
        ListVersionsArgs::command()
    }

    fn run(&self, ctx: &mut ShellContext<'_>, args: &[String]) -> Result<()> {
        let Some(args) = parse_args::<ListVersionsArgs>(ctx, self.command(), args)? else {
            return Ok(());
        };
        let given = (!args.product.is_empty()).then(|| args.product.join(" "));
        let Some(name) = require_value(
            ctx,
            given,
            "Please provide the product (or 'q' to exit): ",
            "ERROR: listversions requires a product.",
        )?
        else {
            return Ok(());
        };
        let product = find_product(&ctx.service, &name)?;
        for version in &product.versions {
            writeln!(ctx.out, "{version}")?;
        }
        Ok(())
    }
}

/// Product by name, ignoring case. Unknown names are an error.
pub(crate) fn find_product(service: &ServiceHandle, name: &str) -> Result<Product> {
    let Some(product) = service
        .list_products()?
        .into_iter()
        .find(|product| product.name.eq_ignore_ascii_case(name.trim()))
    else {
        bail!("{INVALID_PRODUCT}");
    };
    Ok(product)
}
