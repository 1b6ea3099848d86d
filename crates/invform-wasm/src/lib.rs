//! WASM bindings for the invform invoice form.
//!
//! This crate exposes customer info extraction, totals, validation and PDF
//! rendering to the browser form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use invform_core::models::config::InvformConfig;
use invform_core::models::invoice::AMOUNT_OVERFLOW;
use invform_core::{
    CustomerExtraction, CustomerField, CustomerInfo, CustomerInfoParser, Currency, Invoice,
    InvoiceRenderer,
};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn invoice_from_js(invoice: JsValue) -> Result<Invoice, JsValue> {
    serde_wasm_bindgen::from_value(invoice).map_err(to_js_error)
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract customer info from pasted text.
///
/// Returns a record with camelCase keys; fields that were not found are
/// empty strings.
#[wasm_bindgen]
pub fn extract_customer_info(text: &str) -> Result<JsValue, JsValue> {
    to_js(&invform_core::extract_customer_info(text))
}

/// Merge a parsed record into the current form values without overwriting
/// anything the user already typed.
///
/// Returns `{ customer, filled }` where `filled` lists the keys that changed.
#[wasm_bindgen]
pub fn fill_blanks(current: JsValue, parsed: JsValue) -> Result<JsValue, JsValue> {
    let mut current: CustomerInfo = serde_wasm_bindgen::from_value(current).map_err(to_js_error)?;
    let parsed: CustomerInfo = serde_wasm_bindgen::from_value(parsed).map_err(to_js_error)?;

    let filled = current.fill_blanks_from(&parsed);

    #[derive(Serialize)]
    struct FillResult {
        customer: CustomerInfo,
        filled: Vec<&'static str>,
    }

    to_js(&FillResult {
        customer: current,
        filled: filled.iter().map(CustomerField::key).collect(),
    })
}

/// Compute subtotal, total and package count for an invoice form.
///
/// Fails when an amount is too large to total.
#[wasm_bindgen]
pub fn calculate_summary(invoice: JsValue) -> Result<JsValue, JsValue> {
    let summary = invoice_from_js(invoice)?
        .summary()
        .ok_or_else(|| to_js_error(AMOUNT_OVERFLOW))?;
    to_js(&summary)
}

/// List missing required fields. An empty list means ready to render.
#[wasm_bindgen]
pub fn validate_invoice(invoice: JsValue) -> Result<JsValue, JsValue> {
    to_js(&invoice_from_js(invoice)?.validate())
}

/// Format an amount for display, e.g. `$1,234.50`.
#[wasm_bindgen]
pub fn format_amount(amount: f64, currency: &str) -> Result<String, JsValue> {
    let currency = Currency::from_code(currency)
        .ok_or_else(|| to_js_error(format!("unsupported currency: {}", currency)))?;
    let amount = Decimal::try_from(amount).map_err(to_js_error)?;
    Ok(currency.format_amount(amount))
}

/// Catalogue HS code for a product, if it has one.
#[wasm_bindgen]
pub fn default_hs_code(product_name: &str) -> Option<String> {
    invform_core::models::invoice::default_hs_code(product_name).map(String::from)
}

/// Build an invoice number dated today (browser local time).
#[wasm_bindgen]
pub fn generate_invoice_number(country: &str, sequence: u32) -> Result<String, JsValue> {
    let now = js_sys::Date::new_0();
    let today = NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| to_js_error("invalid browser date"))?;

    Ok(invform_core::generate_invoice_number(country, today, sequence))
}

/// Render an invoice form to PDF bytes.
///
/// `config_json` optionally overrides the seller block and page layout with
/// the same JSON used by the CLI config file.
#[wasm_bindgen]
pub fn render_invoice_pdf(invoice: JsValue, config_json: Option<String>) -> Result<Vec<u8>, JsValue> {
    let invoice = invoice_from_js(invoice)?;
    let config = match config_json {
        Some(json) => serde_json::from_str::<InvformConfig>(&json).map_err(to_js_error)?,
        None => InvformConfig::default(),
    };

    InvoiceRenderer::from_config(&config).render(&invoice).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        to_js_error(e)
    })
}

/// Customer extractor class for browser use.
#[wasm_bindgen]
pub struct CustomerExtractor {
    parser: CustomerInfoParser,
}

#[wasm_bindgen]
impl CustomerExtractor {
    /// Create a new customer extractor.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: CustomerInfoParser::new(),
        }
    }

    /// Extract customer info from pasted text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.parser.extract(text))
    }

    /// Extract with per-field confidence, residual text and warnings.
    ///
    /// Blank pastes are rejected, as the form does before auto-filling.
    #[wasm_bindgen]
    pub fn extract_with_metadata(&self, text: &str) -> Result<JsValue, JsValue> {
        let extraction = self.parser.parse_pasted(text).map_err(to_js_error)?;
        to_js(&ExtractResult::from(extraction))
    }
}

impl Default for CustomerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldConfidence {
    field: &'static str,
    value: String,
    confidence: f32,
    source: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResult {
    customer: CustomerInfo,
    residual_text: String,
    parts: Vec<String>,
    matches: Vec<FieldConfidence>,
    warnings: Vec<String>,
}

impl From<CustomerExtraction> for ExtractResult {
    fn from(extraction: CustomerExtraction) -> Self {
        Self {
            matches: extraction
                .matches
                .into_iter()
                .map(|m| FieldConfidence {
                    field: m.field.key(),
                    value: m.found.value,
                    confidence: m.found.confidence,
                    source: m.found.source,
                })
                .collect(),
            customer: extraction.info,
            residual_text: extraction.residual_text,
            parts: extraction.parts,
            warnings: extraction.warnings,
        }
    }
}
