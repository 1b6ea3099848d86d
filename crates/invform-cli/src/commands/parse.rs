//! Parse command - extract customer info from pasted text.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use glob::glob;
use serde::Serialize;
use tracing::{debug, info};

use invform_core::{CustomerExtraction, CustomerField, CustomerInfo, CustomerInfoParser};

use super::read_text;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text files or glob patterns (default: stdin, `-` also reads stdin)
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show per-field confidence scores
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// One parsed input.
struct ParsedInput {
    source: String,
    extraction: CustomerExtraction,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    source: &'a str,
    customer: &'a CustomerInfo,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let sources = expand_inputs(&args.inputs)?;
    let parser = CustomerInfoParser::new();

    let mut parsed = Vec::with_capacity(sources.len());
    for source in sources {
        info!("Parsing customer info from {}", source);
        let text = read_text(&source)?;
        let extraction = parser
            .parse_pasted(&text)
            .map_err(|e| anyhow::anyhow!("{}: {}", display_name(&source), e))?;
        debug!("{} residual parts: {:?}", source, extraction.parts);
        parsed.push(ParsedInput { source, extraction });
    }

    let output = match args.format {
        OutputFormat::Json => format_json(&parsed)?,
        OutputFormat::Csv => format_csv(&parsed)?,
        OutputFormat::Text => format_text(&parsed),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_confidence {
        for input in &parsed {
            print_confidence(input);
        }
    }

    Ok(())
}

/// Expand glob patterns. No inputs means stdin.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<String>> {
    if inputs.is_empty() {
        return Ok(vec!["-".to_string()]);
    }

    let mut sources = Vec::new();
    for input in inputs {
        if input == "-" || !input.contains(['*', '?', '[']) {
            sources.push(input.clone());
            continue;
        }

        let matched: Vec<String> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .map(|p| p.display().to_string())
            .collect();
        if matched.is_empty() {
            anyhow::bail!("No matching files found for pattern: {}", input);
        }
        sources.extend(matched);
    }
    Ok(sources)
}

fn display_name(source: &str) -> &str {
    if source == "-" { "stdin" } else { source }
}

fn format_json(parsed: &[ParsedInput]) -> anyhow::Result<String> {
    if let [single] = parsed {
        return Ok(serde_json::to_string_pretty(&single.extraction.info)?);
    }

    let records: Vec<JsonRecord> = parsed
        .iter()
        .map(|p| JsonRecord {
            source: display_name(&p.source),
            customer: &p.extraction.info,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

fn format_csv(parsed: &[ParsedInput]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["source"];
    header.extend(CustomerField::ALL.iter().map(|f| f.key()));
    wtr.write_record(&header)?;

    for input in parsed {
        let mut row = vec![display_name(&input.source)];
        row.extend(CustomerField::ALL.iter().map(|f| input.extraction.info.get(*f)));
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(parsed: &[ParsedInput]) -> String {
    let mut output = String::new();

    for input in parsed {
        output.push_str(&format!("Source: {}\n", display_name(&input.source)));
        for field in CustomerField::ALL {
            let value = input.extraction.info.get(field);
            let value = if value.is_empty() { "-" } else { value };
            output.push_str(&format!("  {:<12} {}\n", format!("{}:", field.label()), value));
        }
        output.push('\n');
    }

    output
}

fn print_confidence(input: &ParsedInput) {
    eprintln!();
    eprintln!(
        "{} {} ({} matched)",
        style("ℹ").blue(),
        display_name(&input.source),
        input.extraction.matches.len()
    );
    for m in &input.extraction.matches {
        eprintln!(
            "   {:<12} {:>5.1}%  {:?}",
            m.field.label(),
            m.found.confidence * 100.0,
            m.found.source
        );
    }
    for warning in &input.extraction.warnings {
        eprintln!("   {} {}", style("⚠").yellow(), warning);
    }
}
