//! CLI command implementations.

pub mod check;
pub mod config;
pub mod parse;
pub mod render;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info};

use invform_core::models::config::{DefaultsConfig, InvformConfig};
use invform_core::{CustomerField, CustomerInfoParser, Invoice};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invform")
        .join("config.json")
}

/// Config file in effect: the `--config` path if given, else the default.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; the default path falls
/// back to built-in defaults when absent.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<InvformConfig> {
    if let Some(path) = explicit {
        return InvformConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using config file {}", path.display());
        Ok(InvformConfig::from_file(&path)?)
    } else {
        Ok(InvformConfig::default())
    }
}

/// Read a text input. `-` reads stdin.
pub fn read_text(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
}

/// Load an invoice form, applying form defaults for anything left unset.
pub fn load_invoice(path: &Path, defaults: &DefaultsConfig) -> anyhow::Result<Invoice> {
    if !path.exists() {
        anyhow::bail!("Invoice file not found: {}", path.display());
    }

    let content = fs::read_to_string(path)?;
    let mut form: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    apply_form_defaults(&mut form, defaults)?;

    let mut invoice: Invoice = serde_json::from_value(form)
        .with_context(|| format!("Invalid invoice form in {}", path.display()))?;

    for item in &mut invoice.line_items {
        if item.hs_code.trim().is_empty() {
            *item = std::mem::take(item).with_default_hs_code();
        }
    }

    Ok(invoice)
}

/// Fill preselected form values (currency, terms, unit) that the file leaves out.
fn apply_form_defaults(form: &mut Value, defaults: &DefaultsConfig) -> anyhow::Result<()> {
    if let Some(header) = form.get_mut("header").and_then(Value::as_object_mut) {
        header
            .entry("currency")
            .or_insert(serde_json::to_value(defaults.currency)?);

        for (key, default) in [
            ("deliveryMethod", &defaults.delivery_method),
            ("paymentMethod", &defaults.payment_method),
        ] {
            let blank = header
                .get(key)
                .and_then(Value::as_str)
                .is_none_or(|s| s.trim().is_empty());
            if blank {
                header.insert(key.to_string(), Value::String(default.clone()));
            }
        }
    }

    if let Some(items) = form.get_mut("lineItems").and_then(Value::as_array_mut) {
        let unit = serde_json::to_value(defaults.unit)?;
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            item.entry("unit").or_insert_with(|| unit.clone());
        }
    }

    Ok(())
}

/// Auto-fill blank buyer fields from a pasted-text file.
///
/// Returns the fields that were filled. Fields the form already has are
/// never overwritten.
pub fn fill_buyer_from_text(invoice: &mut Invoice, text_path: Option<&Path>) -> anyhow::Result<Vec<CustomerField>> {
    let Some(path) = text_path else {
        return Ok(Vec::new());
    };

    let text = read_text(&path.to_string_lossy())?;
    let extraction = CustomerInfoParser::new()
        .parse_pasted(&text)
        .with_context(|| format!("Nothing to extract from {}", path.display()))?;

    let filled = invoice.buyer.fill_blanks_from(&extraction.info);
    info!(
        "Filled {} buyer field(s) from {}",
        filled.len(),
        path.display()
    );
    Ok(filled)
}
