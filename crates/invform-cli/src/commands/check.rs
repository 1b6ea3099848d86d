//! Check command - fill and validate an invoice form.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rust_decimal::Decimal;

use invform_core::{CustomerField, Invoice};

use super::{fill_buyer_from_text, load_config, load_invoice};

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Invoice form (JSON)
    #[arg(required = true)]
    invoice: PathBuf,

    /// Pasted customer details used to fill blank buyer fields
    #[arg(long)]
    customer_text: Option<PathBuf>,

    /// Fail when the invoice is not ready to render
    #[arg(long)]
    strict: bool,
}

pub fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut invoice = load_invoice(&args.invoice, &config.defaults)?;
    let filled = fill_buyer_from_text(&mut invoice, args.customer_text.as_deref())?;

    print!("{}", format_report(&invoice, &filled));

    let issues = invoice.validate();
    if issues.is_empty() {
        println!("{} Ready to render", style("✓").green());
        return Ok(());
    }

    println!("{}", style("Validation issues:").yellow());
    for issue in &issues {
        println!("  - {}", issue);
    }

    if args.strict {
        anyhow::bail!("Invoice has {} issue(s)", issues.len());
    }
    Ok(())
}

fn format_report(invoice: &Invoice, filled: &[CustomerField]) -> String {
    let currency = invoice.header.currency;
    let number = match invoice.header.number.trim() {
        "" => "(not assigned)",
        number => number,
    };

    let mut output = String::new();
    output.push_str(&format!("Invoice: {}\n", number));
    output.push_str(&format!("Date: {}\n", invoice.header.date));
    output.push_str(&format!(
        "Terms: {} / {}\n",
        invoice.header.delivery_method, invoice.header.payment_method
    ));
    output.push('\n');

    output.push_str("Buyer:\n");
    for field in CustomerField::ALL {
        let value = invoice.buyer.get(field);
        if value.is_empty() {
            continue;
        }
        let marker = if filled.contains(&field) { " (from text)" } else { "" };
        output.push_str(&format!("  {}: {}{}\n", field.label(), value, marker));
    }
    output.push('\n');

    let complete = invoice.complete_items().count();
    output.push_str(&format!(
        "Items: {} ({} complete)\n",
        invoice.line_items.len(),
        complete
    ));
    match invoice.summary() {
        Some(summary) => {
            output.push_str(&format!("  Subtotal:   {}\n", currency.format_amount(summary.subtotal)));
            for (label, amount) in [
                ("Shipping:", summary.shipping_fee),
                ("Custom fee:", summary.custom_fee),
                ("Discount:", summary.discount),
            ] {
                if amount > Decimal::ZERO {
                    output.push_str(&format!("  {:<11} {}\n", label, currency.format_amount(amount)));
                }
            }
            output.push_str(&format!("  Total:      {}\n", currency.format_amount(summary.total)));
            output.push_str(&format!("  Packages:   {}\n", summary.total_packages));
        }
        None => output.push_str("  Total:      (too large to compute)\n"),
    }
    output.push('\n');

    output
}
