//! Render command - write an invoice form as PDF.

use std::path::PathBuf;

use chrono::Timelike;
use clap::Args;
use console::style;
use tracing::{debug, info};

use invform_core::{generate_invoice_number, InvoiceRenderer};

use super::{fill_buyer_from_text, load_config, load_invoice};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Invoice form (JSON)
    #[arg(required = true)]
    invoice: PathBuf,

    /// Output file (default: {invoice number}.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pasted customer details used to fill blank buyer fields
    #[arg(long)]
    customer_text: Option<PathBuf>,

    /// Sequence for a newly assigned invoice number (default: from the clock)
    #[arg(long)]
    number_seq: Option<u32>,
}

pub fn run(args: RenderArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut invoice = load_invoice(&args.invoice, &config.defaults)?;
    fill_buyer_from_text(&mut invoice, args.customer_text.as_deref())?;

    if invoice.header.number.trim().is_empty() {
        let sequence = args
            .number_seq
            .unwrap_or_else(|| chrono::Local::now().nanosecond() / 1_000_000);
        invoice.header.number =
            generate_invoice_number(&invoice.buyer.country, invoice.header.date, sequence);
        info!("Assigned invoice number {}", invoice.header.number);
    }

    let renderer = InvoiceRenderer::from_config(&config);
    let bytes = renderer.render(&invoice)?;

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", invoice.header.number)));
    std::fs::write(&output_path, &bytes)?;
    debug!("Wrote {} bytes", bytes.len());

    println!(
        "{} Invoice {} written to {}",
        style("✓").green(),
        invoice.header.number,
        output_path.display()
    );

    Ok(())
}
