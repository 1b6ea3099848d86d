//! Invoice form data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::SellerConfig;
use super::customer::CustomerInfo;

/// Validation issue reported when the totals cannot be computed.
pub const AMOUNT_OVERFLOW: &str = "Amounts are too large to total";

/// A complete invoice form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Invoice header information.
    pub header: InvoiceHeader,

    /// Seller block. Falls back to the configured seller when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<SellerConfig>,

    /// Buyer information.
    #[serde(default)]
    pub buyer: CustomerInfo,

    /// Product rows.
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Extra charges and discount.
    #[serde(default)]
    pub charges: Charges,
}

/// Invoice header with basic information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceHeader {
    /// Invoice number. Empty until one is generated.
    #[serde(default)]
    pub number: String,

    /// Invoice date.
    pub date: NaiveDate,

    /// Invoice currency.
    #[serde(default)]
    pub currency: Currency,

    /// Delivery terms (e.g. EXW, FOB).
    #[serde(default)]
    pub delivery_method: String,

    /// Payment terms (e.g. T/T, PayPal).
    #[serde(default)]
    pub payment_method: String,
}

/// Supported invoice currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Cny,
}

impl Currency {
    /// ISO code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Cny => "CNY",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Cny => "¥",
        }
    }

    /// Parse an ISO code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "CNY" => Some(Currency::Cny),
            _ => None,
        }
    }

    /// Format an amount with the currency symbol.
    ///
    /// Two decimals always. Amounts below 10000 get `,` thousands
    /// separators; larger amounts are printed without them so they fit in
    /// narrow table cells.
    pub fn format_amount(&self, amount: Decimal) -> String {
        let fixed = format!("{:.2}", amount.round_dp(2));
        if amount >= Decimal::from(10_000) {
            return format!("{}{}", self.symbol(), fixed);
        }

        let (sign, unsigned) = match fixed.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", fixed.as_str()),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }

        format!("{}{}{}.{}", self.symbol(), sign, grouped, frac_part)
    }
}

/// Unit of measure for a product row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Pcs,
    Set,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pcs => "pcs",
            Unit::Set => "set",
        }
    }
}

/// A single product row on the invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    /// Product name.
    pub name: String,

    /// Model number.
    pub model: String,

    /// Harmonized System customs code.
    pub hs_code: String,

    /// Quantity.
    pub quantity: u32,

    /// Unit of measure.
    pub unit: Unit,

    /// Unit price. `None` when the price field was left blank.
    pub unit_price: Option<Decimal>,
}

/// Default HS code for catalogue products that have a fixed one.
pub fn default_hs_code(product_name: &str) -> Option<&'static str> {
    match product_name.trim() {
        "Gate Remote" => Some("8526920000"),
        "Gate Receiver" => Some("8529909090"),
        _ => None,
    }
}

impl LineItem {
    /// Create a row for a product, pre-filling the HS code when known.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            quantity: 1,
            ..Default::default()
        }
        .with_default_hs_code()
    }

    /// Set quantity and unit price.
    pub fn priced(mut self, quantity: u32, unit_price: Decimal) -> Self {
        self.quantity = quantity;
        self.unit_price = Some(unit_price);
        self
    }

    /// Fill the HS code from the product catalogue if the name has one.
    pub fn with_default_hs_code(mut self) -> Self {
        if let Some(code) = default_hs_code(&self.name) {
            self.hs_code = code.to_string();
        }
        self
    }

    /// Row total, rounded to cents. A blank price counts as zero.
    ///
    /// Returns `None` when the product does not fit in a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity)
            .checked_mul(self.unit_price.unwrap_or_default())
            .map(|total| total.round_dp(2))
    }

    /// Whether every field required for printing is filled in.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.model.trim().is_empty()
            && !self.hs_code.trim().is_empty()
            && self.quantity > 0
            && self.unit_price.is_some()
    }
}

/// Extra charges applied on top of the product subtotal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Charges {
    /// Shipping fee.
    pub shipping_fee: Decimal,

    /// Discount subtracted from the total.
    pub discount: Decimal,

    /// Customization fee.
    pub custom_fee: Decimal,
}

/// Computed invoice totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSummary {
    /// Sum of all row totals.
    pub subtotal: Decimal,

    /// Shipping fee.
    pub shipping_fee: Decimal,

    /// Customization fee.
    pub custom_fee: Decimal,

    /// Discount.
    pub discount: Decimal,

    /// subtotal + shipping + custom fee - discount.
    pub total: Decimal,

    /// Sum of row quantities.
    pub total_packages: u64,
}

impl Invoice {
    /// Create an empty invoice dated `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            header: InvoiceHeader {
                number: String::new(),
                date,
                currency: Currency::default(),
                delivery_method: String::new(),
                payment_method: String::new(),
            },
            seller: None,
            buyer: CustomerInfo::default(),
            line_items: Vec::new(),
            charges: Charges::default(),
        }
    }

    /// Compute totals over all rows.
    ///
    /// Returns `None` when any amount overflows.
    pub fn summary(&self) -> Option<InvoiceSummary> {
        let mut subtotal = Decimal::ZERO;
        for item in &self.line_items {
            subtotal = subtotal.checked_add(item.total()?)?;
        }
        let total_packages = self.line_items.iter().map(|i| u64::from(i.quantity)).sum();
        let Charges {
            shipping_fee,
            discount,
            custom_fee,
        } = self.charges.clone();

        let total = subtotal
            .checked_add(shipping_fee)?
            .checked_add(custom_fee)?
            .checked_sub(discount)?;

        Some(InvoiceSummary {
            subtotal,
            shipping_fee,
            custom_fee,
            discount,
            total,
            total_packages,
        })
    }

    /// Rows that are complete enough to print.
    pub fn complete_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|i| i.is_complete())
    }

    /// Check required fields and return any issues found.
    ///
    /// Only presence is checked; values are not otherwise validated.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let required = [
            ("contact", &self.buyer.contact),
            ("address", &self.buyer.address),
            ("city", &self.buyer.city),
            ("country", &self.buyer.country),
            ("postal code", &self.buyer.postal_code),
            ("phone", &self.buyer.phone),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                issues.push(format!("Missing buyer {}", label));
            }
        }

        if self.header.delivery_method.trim().is_empty() {
            issues.push("Missing delivery method".to_string());
        }
        if self.header.payment_method.trim().is_empty() {
            issues.push("Missing payment method".to_string());
        }

        if self.complete_items().next().is_none() {
            issues.push("No complete line item".to_string());
        }

        if self.summary().is_none() {
            issues.push(AMOUNT_OVERFLOW.to_string());
        }

        issues
    }
}

/// Build an invoice number of the form `INV-{CC}-{DDMMYY}-{NNN}`.
///
/// `CC` is `UK` for the United Kingdom (and British/English variants), or
/// the first two letters of the country name otherwise. `sequence` is
/// supplied by the caller; only its last three digits are used.
pub fn generate_invoice_number(country: &str, date: NaiveDate, sequence: u32) -> String {
    format!(
        "INV-{}-{}-{:03}",
        number_country_code(country),
        date.format("%d%m%y"),
        sequence % 1000
    )
}

fn number_country_code(country: &str) -> String {
    let name = match country.trim() {
        "" => "International",
        name => name,
    };

    let lower = name.to_lowercase();
    if lower == "united kingdom" || lower == "uk" || lower == "england" || lower.contains("british") {
        return "UK".to_string();
    }

    name.chars().take(2).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 7).unwrap()
    }

    fn complete_invoice() -> Invoice {
        let mut invoice = Invoice::new(date());
        invoice.header.delivery_method = "EXW".to_string();
        invoice.header.payment_method = "T/T".to_string();
        invoice.buyer = CustomerInfo {
            company: "Acme Corp".to_string(),
            contact: "John Smith".to_string(),
            address: "123 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "62704".to_string(),
            phone: "555-123-4567".to_string(),
            country: "United States".to_string(),
            ..Default::default()
        };
        invoice.line_items.push(
            LineItem::new("Gate Remote", "GR-433").priced(10, Decimal::new(1250, 2)),
        );
        invoice
    }

    #[test]
    fn test_format_amount_groups_small_amounts() {
        assert_eq!(Currency::Usd.format_amount(Decimal::new(123456, 2)), "$1,234.56");
        assert_eq!(Currency::Eur.format_amount(Decimal::new(5, 0)), "€5.00");
        assert_eq!(Currency::Cny.format_amount(Decimal::new(999999, 2)), "¥9,999.99");
    }

    #[test]
    fn test_format_amount_large_amounts_ungrouped() {
        assert_eq!(Currency::Usd.format_amount(Decimal::new(1000000, 2)), "$10000.00");
        assert_eq!(Currency::Usd.format_amount(Decimal::new(12345678, 2)), "$123456.78");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(Currency::Usd.format_amount(Decimal::new(-150000, 2)), "$-1,500.00");
    }

    #[test]
    fn test_currency_serde_codes() {
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
        let parsed: Currency = serde_json::from_str("\"CNY\"").unwrap();
        assert_eq!(parsed, Currency::Cny);
        assert_eq!(Currency::from_code("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_code("GBP"), None);
    }

    #[test]
    fn test_default_hs_code() {
        assert_eq!(LineItem::new("Gate Remote", "A").hs_code, "8526920000");
        assert_eq!(LineItem::new("Gate Receiver", "B").hs_code, "8529909090");
        assert_eq!(LineItem::new("Wifi Switch", "C").hs_code, "");
    }

    #[test]
    fn test_summary_totals() {
        let mut invoice = complete_invoice();
        invoice.line_items.push(
            LineItem::new("Wifi Socket", "WS-1").priced(3, Decimal::new(999, 2)),
        );
        invoice.charges = Charges {
            shipping_fee: Decimal::new(2500, 2),
            discount: Decimal::new(1000, 2),
            custom_fee: Decimal::new(500, 2),
        };

        let summary = invoice.summary().unwrap();

        assert_eq!(summary.subtotal, Decimal::new(15497, 2));
        assert_eq!(summary.total, Decimal::new(17497, 2));
        assert_eq!(summary.total_packages, 13);
    }

    #[test]
    fn test_blank_price_counts_as_zero() {
        let item = LineItem {
            name: "Wifi Switch".to_string(),
            quantity: 4,
            ..Default::default()
        };
        assert_eq!(item.total(), Some(Decimal::ZERO));
        assert!(!item.is_complete());
    }

    #[test]
    fn test_validate_complete_invoice() {
        assert!(complete_invoice().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let mut invoice = complete_invoice();
        invoice.buyer.phone.clear();
        invoice.header.payment_method = "  ".to_string();
        invoice.line_items[0].model.clear();

        let issues = invoice.validate();

        assert_eq!(
            issues,
            vec![
                "Missing buyer phone".to_string(),
                "Missing payment method".to_string(),
                "No complete line item".to_string(),
            ]
        );
    }

    #[test]
    fn test_invoice_number_uses_country_prefix() {
        assert_eq!(
            generate_invoice_number("Germany", date(), 42),
            "INV-GE-070326-042"
        );
        assert_eq!(
            generate_invoice_number("", date(), 7),
            "INV-IN-070326-007"
        );
        assert_eq!(
            generate_invoice_number("Germany", date(), 1999),
            "INV-GE-070326-999"
        );
    }

    #[test]
    fn test_invoice_number_united_kingdom_variants() {
        for country in ["United Kingdom", "uk", "England", "British Virgin Islands"] {
            assert!(
                generate_invoice_number(country, date(), 1).starts_with("INV-UK-"),
                "{country}"
            );
        }
    }

    #[test]
    fn test_invoice_deserializes_from_form_json() {
        let json = r#"{
            "header": { "date": "2026-03-07", "currency": "EUR",
                        "deliveryMethod": "FOB", "paymentMethod": "T/T" },
            "buyer": { "company": "Acme Corp", "postalCode": "62704" },
            "lineItems": [ { "name": "Gate Remote", "model": "GR", "hsCode": "8526920000",
                             "quantity": 2, "unit": "set", "unitPrice": "19.90" } ],
            "charges": { "shippingFee": 5 }
        }"#;

        let invoice: Invoice = serde_json::from_str(json).unwrap();

        assert_eq!(invoice.header.currency, Currency::Eur);
        assert_eq!(invoice.buyer.postal_code, "62704");
        assert_eq!(invoice.line_items[0].unit, Unit::Set);
        assert_eq!(invoice.summary().unwrap().total, Decimal::new(4480, 2));
    }

    #[test]
    fn test_oversized_amounts_are_reported_not_panicking() {
        let mut invoice = complete_invoice();
        invoice.line_items[0].unit_price = Some(Decimal::MAX);

        assert_eq!(invoice.line_items[0].total(), None);
        assert!(invoice.summary().is_none());
        assert_eq!(invoice.validate(), vec![AMOUNT_OVERFLOW.to_string()]);
    }

    #[test]
    fn test_overflowing_charges_are_reported() {
        let mut invoice = complete_invoice();
        invoice.charges.shipping_fee = Decimal::MAX;
        invoice.charges.custom_fee = Decimal::MAX;

        assert!(invoice.summary().is_none());
        assert!(invoice.validate().contains(&AMOUNT_OVERFLOW.to_string()));
    }
}
