//! Configuration structures for invoice rendering.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::invoice::{Currency, Unit};
use crate::error::ConfigError;

/// Main configuration for invform.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvformConfig {
    /// Seller block printed on every invoice.
    pub seller: SellerConfig,

    /// Defaults for new invoice forms.
    pub defaults: DefaultsConfig,

    /// PDF layout configuration.
    pub pdf: PdfConfig,
}

/// Seller details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerConfig {
    /// Short brand mark printed in the header bar.
    pub logo_text: String,

    /// Legal company name.
    pub company: String,

    /// Address lines, top to bottom.
    pub address_lines: Vec<String>,

    /// Contact person.
    pub contact: String,

    /// Phone number.
    pub phone: String,
}

impl Default for SellerConfig {
    fn default() -> Self {
        Self {
            logo_text: "CHJ".to_string(),
            company: "Dongguan Chuangjiang Electronic Co., Ltd.".to_string(),
            address_lines: vec![
                "8th Floor, Building 1, Huawei Kegu Industrial Park".to_string(),
                "Dalingshan Town, Dongguan City".to_string(),
                "Guangdong Province, China".to_string(),
            ],
            contact: "Eric Huang".to_string(),
            phone: "+86 180 2899 3261".to_string(),
        }
    }
}

/// Defaults applied to new invoice forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Invoice currency.
    pub currency: Currency,

    /// Delivery terms.
    pub delivery_method: String,

    /// Payment terms.
    pub payment_method: String,

    /// Unit for new product rows.
    pub unit: Unit,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Usd,
            delivery_method: "EXW".to_string(),
            payment_method: "T/T".to_string(),
            unit: Unit::Pcs,
        }
    }
}

/// PDF layout configuration. Lengths are in millimetres.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Page width.
    pub page_width_mm: f32,

    /// Page height.
    pub page_height_mm: f32,

    /// Blank margin on every side.
    pub margin_mm: f32,

    /// Brand colour (RGB) for the header bar, headings and table header.
    pub brand_color: [u8; 3],
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            brand_color: [30, 115, 190],
        }
    }
}

impl InvformConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
