//! Ordered detect-and-strip parser for pasted customer details.

use tracing::{debug, trace};

use crate::error::ExtractionError;
use crate::models::customer::{CustomerField, CustomerInfo};

use super::rules::{
    patterns::{CITY_TAIL, RESIDUAL_LABEL, SEGMENT_SEPARATOR},
    CountryExtractor, EmailExtractor, ExtractionMatch, FieldExtractor, PhoneExtractor, PostalCodeExtractor,
    TaxIdExtractor,
};
use super::Result;

/// Longest second segment still treated as a contact name (in characters).
const MAX_CONTACT_LEN: usize = 50;

type RuleExtractor = Box<dyn FieldExtractor<Output = ExtractionMatch<String>> + Send + Sync>;

/// One high-precision extraction step.
struct ExtractionRule {
    field: CustomerField,
    extractor: RuleExtractor,
}

impl ExtractionRule {
    fn new<E>(field: CustomerField, extractor: E) -> Self
    where
        E: FieldExtractor<Output = ExtractionMatch<String>> + Send + Sync + 'static,
    {
        Self {
            field,
            extractor: Box::new(extractor),
        }
    }
}

/// A field claimed by one of the pattern rules (or country detection).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch {
    pub field: CustomerField,
    pub found: ExtractionMatch<String>,
}

/// Full result of one extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerExtraction {
    /// The structured record.
    pub info: CustomerInfo,
    /// Pattern matches in rule order.
    pub matches: Vec<FieldMatch>,
    /// Text left after claimed spans and the country alias were removed.
    pub residual_text: String,
    /// Residual text split into trimmed, non-empty segments.
    pub parts: Vec<String>,
    /// Fields that could not be found.
    pub warnings: Vec<String>,
}

/// Customer info parser.
///
/// Pattern rules run in a fixed order over the pasted text. Every span a
/// rule claims is removed before the leftover text is segmented by
/// position into company, contact, address and city, so a token taken by
/// a pattern can never leak into those free-text fields.
pub struct CustomerInfoParser {
    rules: Vec<ExtractionRule>,
    country: CountryExtractor,
}

impl CustomerInfoParser {
    /// Create a parser with the default rule order: tax ID, email, phone,
    /// postal code.
    pub fn new() -> Self {
        Self {
            rules: vec![
                ExtractionRule::new(CustomerField::TaxId, TaxIdExtractor::new()),
                ExtractionRule::new(CustomerField::Email, EmailExtractor::new()),
                ExtractionRule::new(CustomerField::Phone, PhoneExtractor::new()),
                ExtractionRule::new(CustomerField::PostalCode, PostalCodeExtractor::new()),
            ],
            country: CountryExtractor::new(),
        }
    }

    /// Fields covered by pattern rules, in the order they run.
    pub fn rule_order(&self) -> Vec<CustomerField> {
        self.rules.iter().map(|r| r.field).collect()
    }

    /// Extract a customer record. Never fails; unmatched fields stay empty.
    pub fn parse(&self, text: &str) -> CustomerExtraction {
        debug!("Extracting customer info from {} characters of text", text.len());

        let mut info = CustomerInfo::default();
        let mut matches = Vec::new();
        let mut claimed = Vec::new();

        for rule in &self.rules {
            if let Some(found) = rule.extractor.extract(text) {
                trace!("{} matched {:?}", rule.field.label(), found.source);
                info.set(rule.field, found.value.as_str());
                if let Some(span) = found.position {
                    claimed.push(span);
                }
                matches.push(FieldMatch {
                    field: rule.field,
                    found,
                });
            }
        }

        let claimed = merge_spans(claimed);
        let mut residual_text = remove_spans(text, &claimed);

        if let Some(country) = self.country.detect(&residual_text) {
            trace!("Country alias {:?} -> {}", country.alias, country.name());
            let mut found = country.to_extraction(&residual_text);
            let (start, end) = country.position;
            found.position = Some((
                original_offset(start, &claimed, true),
                original_offset(end, &claimed, false),
            ));
            matches.push(FieldMatch {
                field: CustomerField::Country,
                found,
            });
            info.country = country.name().to_string();
            residual_text = country.strip_from(&residual_text);
        }

        let parts = split_parts(&residual_text);
        assign_parts(&parts, &mut info);

        let warnings = info
            .missing_fields()
            .into_iter()
            .map(|f| format!("Could not extract {}", f.label().to_lowercase()))
            .collect();

        debug!(
            "Extracted {} of {} customer fields",
            CustomerField::ALL.len() - info.missing_fields().len(),
            CustomerField::ALL.len()
        );

        CustomerExtraction {
            info,
            matches,
            residual_text,
            parts,
            warnings,
        }
    }

    /// Extract from pasted text, rejecting blank pastes.
    ///
    /// The paste is trimmed first, as the form does before parsing.
    pub fn parse_pasted(&self, text: &str) -> Result<CustomerExtraction> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        Ok(self.parse(text))
    }

    /// Extract only the record.
    pub fn extract(&self, text: &str) -> CustomerInfo {
        self.parse(text).info
    }
}

impl Default for CustomerInfoParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract a customer record from pasted text with the default parser.
pub fn extract_customer_info(text: &str) -> CustomerInfo {
    CustomerInfoParser::new().extract(text)
}

/// Sort byte spans and merge the ones that overlap or touch.
fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Remove sorted, non-overlapping byte spans from `text`.
fn remove_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in spans {
        out.push_str(&text[cursor..start]);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Map a byte offset in the residual text back to the original text.
///
/// A removed span sitting exactly at `offset` is skipped for a start
/// offset and not for an end offset.
fn original_offset(offset: usize, removed: &[(usize, usize)], is_start: bool) -> usize {
    let mut mapped = offset;
    for &(start, end) in removed {
        if start < mapped || (is_start && start == mapped) {
            mapped += end - start;
        } else {
            break;
        }
    }
    mapped
}

fn split_parts(residual: &str) -> Vec<String> {
    SEGMENT_SEPARATOR
        .split(residual)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn looks_like_contact(part: &str) -> bool {
    part.chars().count() < MAX_CONTACT_LEN && !part.chars().any(|c| c.is_ascii_digit())
}

/// Positional assignment: first part is the company, a short digit-free
/// second part is the contact, the rest is address material.
fn assign_parts(parts: &[String], info: &mut CustomerInfo) {
    let Some(company) = parts.first() else {
        return;
    };
    info.company = company.clone();

    let has_contact = match parts.get(1) {
        Some(second) if looks_like_contact(second) => {
            info.contact = second.clone();
            true
        }
        Some(second) => {
            info.address = second.clone();
            false
        }
        None => return,
    };

    let address_parts: Vec<&str> = parts
        .iter()
        .skip(if has_contact { 2 } else { 1 })
        .map(String::as_str)
        .filter(|p| !RESIDUAL_LABEL.is_match(p))
        .collect();

    if !address_parts.is_empty() {
        let (address, city) = split_city(&address_parts.join(", "));
        info.address = address;
        info.city = city;
    }
}

/// Split a joined address into `(address, city)`.
///
/// The city is the letter run after the last usable comma that is
/// followed by a region code, a 5-digit code or the end of the text. The
/// follower itself stays in the address. Without a city the whole text is
/// the address.
pub(crate) fn split_city(address_text: &str) -> (String, String) {
    let Some(caps) = CITY_TAIL.captures(address_text) else {
        return (address_text.to_string(), String::new());
    };
    let (Some(whole), Some(city), Some(tail)) = (caps.get(0), caps.get(1), caps.get(2)) else {
        return (address_text.to_string(), String::new());
    };

    let mut address = String::with_capacity(address_text.len());
    address.push_str(&address_text[..whole.start()]);
    address.push_str(&address_text[tail.start()..]);

    let address = address
        .trim_start_matches(|c: char| c == ',' || c.is_whitespace())
        .trim()
        .to_string();

    (address, city.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_scenario() {
        let text = "Acme Corp, John Smith, 123 Main St, Springfield, US 62704, john@acme.com, Tel: 555-123-4567";

        let info = extract_customer_info(text);

        assert_eq!(info.email, "john@acme.com");
        assert!(info.phone.contains("555-123-4567"));
        assert_eq!(info.postal_code, "62704");
        assert_eq!(info.country, "United States");
        assert_eq!(info.company, "Acme Corp");
        assert_eq!(info.contact, "John Smith");
        assert_eq!(info.address, "123 Main St");
        assert_eq!(info.city, "Springfield");
        assert_eq!(info.tax_id, "");
    }

    #[test]
    fn test_no_patterns_becomes_company() {
        let info = extract_customer_info("hello world");
        assert_eq!(
            info,
            CustomerInfo {
                company: "hello world".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_input_yields_empty_record() {
        let extraction = CustomerInfoParser::new().parse("");
        assert!(extraction.info.is_empty());
        assert!(extraction.parts.is_empty());
        assert_eq!(extraction.warnings.len(), 9);
    }

    #[test]
    fn test_parse_pasted_rejects_blank() {
        let parser = CustomerInfoParser::new();
        assert_eq!(parser.parse_pasted("  \n\t ").unwrap_err(), ExtractionError::EmptyInput);
        assert_eq!(parser.parse_pasted("  hello world \n").unwrap().info.company, "hello world");
    }

    #[test]
    fn test_multiline_with_tax_id_and_labels() {
        let text = "Kraft GmbH\nAnna Becker\nPhone: +49 30 1234567\nHauptstrasse 5, 10115 Berlin\nVAT: DE123456789\nGermany";

        let info = extract_customer_info(text);

        assert_eq!(info.company, "Kraft GmbH");
        assert_eq!(info.contact, "Anna Becker");
        assert_eq!(info.phone, "+49 30 1234567");
        assert_eq!(info.postal_code, "10115");
        assert_eq!(info.tax_id, "DE123456789");
        assert_eq!(info.country, "Germany");
        assert_eq!(info.address, "Hauptstrasse 5");
        assert_eq!(info.city, "Berlin");
    }

    #[test]
    fn test_last_postal_code_and_address_without_contact() {
        let text = "Acme Corp, Suite 10001, 742 Evergreen Terrace, Springfield, USA 49007";

        let info = extract_customer_info(text);

        assert_eq!(info.postal_code, "49007");
        assert_eq!(info.country, "United States");
        assert_eq!(info.contact, "");
        assert_eq!(info.address, "Suite 10001, 742 Evergreen Terrace");
        assert_eq!(info.city, "Springfield");
    }

    #[test]
    fn test_country_alias_removed_before_segmentation() {
        let extraction =
            CustomerInfoParser::new().parse("Widget Ltd, Jane Doe, 10 Downing Street, London, UK");

        assert_eq!(extraction.info.country, "United Kingdom");
        assert!(!extraction.residual_text.contains("UK"));
        assert_eq!(
            extraction.parts,
            vec!["Widget Ltd", "Jane Doe", "10 Downing Street", "London"]
        );
        assert_eq!(extraction.info.city, "London");
        assert_eq!(extraction.info.address, "10 Downing Street");
    }

    #[test]
    fn test_residual_label_segments_skipped() {
        let text = "Nordic AB\nOla Nordmann\nStorgata 1\nOslo\nEmail: ola@nordic.no\nMobile: +47 912 34 567";

        let extraction = CustomerInfoParser::new().parse(text);
        let info = &extraction.info;

        assert_eq!(info.email, "ola@nordic.no");
        assert_eq!(info.phone, "+47 912 34 567");
        assert_eq!(info.country, "");
        assert_eq!(extraction.parts.last().map(String::as_str), Some("Email:"));
        assert_eq!(info.address, "Storgata 1");
        assert_eq!(info.city, "Oslo");
    }

    #[test]
    fn test_second_part_with_digits_is_address() {
        let info = extract_customer_info("Acme Corp\n42 Harbour Road\nPortsmouth");
        assert_eq!(info.contact, "");
        assert_eq!(info.address, "42 Harbour Road");
        assert_eq!(info.city, "Portsmouth");

        let info = extract_customer_info("Acme Corp\n42 Harbour Road");
        assert_eq!(info.address, "42 Harbour Road");
        assert_eq!(info.city, "");
    }

    #[test]
    fn test_long_second_part_is_address() {
        let long = "Old Harbour Pavilion Back Row Block Gamma Upper Floor Top Room";
        assert!(long.len() >= 50);
        let info = extract_customer_info(&format!("Acme Corp\n{long}"));
        assert_eq!(info.contact, "");
        assert_eq!(info.address, long);
    }

    #[test]
    fn test_region_code_stays_in_address() {
        let info = extract_customer_info("Acme Corp, Bob Stone, 5 Elm St, Boston, MA");
        assert_eq!(info.contact, "Bob Stone");
        assert_eq!(info.city, "Boston");
        assert_eq!(info.address, "5 Elm St, MA");
    }

    #[test]
    fn test_overlapping_spans_removed_once() {
        let extraction = CustomerInfoParser::new().parse("Acme Corp, Tel: 13800138000");

        assert_eq!(extraction.info.tax_id, "13800138000");
        assert_eq!(extraction.info.phone, "13800138000");
        assert_eq!(extraction.residual_text, "Acme Corp, ");
        assert_eq!(extraction.parts, vec!["Acme Corp"]);
    }

    #[test]
    fn test_removal_is_position_aware() {
        let extraction = CustomerInfoParser::new().parse("Ref 62704-A, Acme Corp, Shelbyville 62704");

        assert_eq!(extraction.info.postal_code, "62704");
        assert!(extraction.residual_text.starts_with("Ref 62704-A"));
        assert!(!extraction.residual_text.trim_end().ends_with("62704"));
    }

    #[test]
    fn test_postal_code_glued_to_cjk_text() {
        let text = "Tokyo Trading\n东京都港区12345\nJapan";
        let extraction = CustomerInfoParser::new().parse(text);

        assert_eq!(extraction.info.postal_code, "12345");
        assert_eq!(extraction.info.company, "Tokyo Trading");
        assert_eq!(extraction.info.contact, "东京都港区");
        assert_eq!(extraction.info.country, "Japan");
        assert_eq!(extraction.residual_text, "Tokyo Trading\n东京都港区\n");
    }

    #[test]
    fn test_phone_with_no_break_spaces() {
        let info = extract_customer_info("Paris SARL, Tel: +33\u{a0}1\u{a0}23\u{a0}45\u{a0}67\u{a0}89");

        assert_eq!(info.phone, "+33\u{a0}1\u{a0}23\u{a0}45\u{a0}67\u{a0}89");
        assert_eq!(info.company, "Paris SARL");
        assert_eq!(info.country, "");
    }

    #[test]
    fn test_country_match_span_points_into_original_text() {
        let text = "Tokyo Trading\n东京都港区12345\nJapan";
        let extraction = CustomerInfoParser::new().parse(text);
        let country = extraction
            .matches
            .iter()
            .find(|m| m.field == CustomerField::Country)
            .unwrap();

        assert_eq!(country.found.position, Some((text.len() - 5, text.len())));
        assert_eq!(country.found.source, "Japan");

        let text = "Acme Corp, John Smith, 123 Main St, Springfield, US 62704, john@acme.com";
        let extraction = CustomerInfoParser::new().parse(text);
        for m in &extraction.matches {
            let (start, end) = m.found.position.unwrap();
            assert!(text[start..end].contains(&m.found.source), "{:?}", m.field);
        }
    }

    #[test]
    fn test_original_offset_skips_removed_spans() {
        // "ab[cd]ef[gh]ij" with the bracketed spans removed -> "abefij"
        let removed = [(2, 4), (6, 8)];
        assert_eq!(original_offset(2, &removed, true), 4);
        assert_eq!(original_offset(2, &removed, false), 2);
        assert_eq!(original_offset(4, &removed, true), 8);
        assert_eq!(original_offset(5, &removed, false), 9);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = CustomerInfoParser::new();
        let text = "Acme Corp, John Smith, 123 Main St, Springfield, US 62704, john@acme.com, Tel: 555-123-4567";
        assert_eq!(parser.parse(text), parser.parse(text));
    }

    #[test]
    fn test_matches_follow_rule_order() {
        let parser = CustomerInfoParser::new();
        assert_eq!(
            parser.rule_order(),
            vec![
                CustomerField::TaxId,
                CustomerField::Email,
                CustomerField::Phone,
                CustomerField::PostalCode
            ]
        );

        let text = "Acme Corp, John Smith, 123 Main St, Springfield, US 62704, john@acme.com, Tel: 555-123-4567";
        let fields: Vec<CustomerField> = parser.parse(text).matches.iter().map(|m| m.field).collect();
        assert_eq!(
            fields,
            vec![
                CustomerField::Email,
                CustomerField::Phone,
                CustomerField::PostalCode,
                CustomerField::Country
            ]
        );
    }

    #[test]
    fn test_split_city_variants() {
        assert_eq!(
            split_city("123 Main St, Springfield"),
            ("123 Main St".to_string(), "Springfield".to_string())
        );
        assert_eq!(
            split_city("Road 8, Shenzhen, 51800"),
            ("Road 8, 51800".to_string(), "Shenzhen".to_string())
        );
        assert_eq!(
            split_city("科技园 8号, 深圳"),
            ("科技园 8号".to_string(), "深圳".to_string())
        );
        assert_eq!(split_city("Storgata 1"), ("Storgata 1".to_string(), String::new()));
    }

    #[test]
    fn test_remove_spans_merges_overlaps() {
        let merged = merge_spans(vec![(5, 7), (1, 3), (2, 4)]);
        assert_eq!(merged, vec![(1, 4), (5, 7)]);
        assert_eq!(remove_spans("abcdefgh", &merged), "aeh");
        assert_eq!(remove_spans("abc", &[]), "abc");
    }
}
