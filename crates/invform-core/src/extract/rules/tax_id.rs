//! VAT / tax ID extraction.

use super::patterns::TAX_ID;
use super::{ExtractionMatch, FieldExtractor};

/// Tax ID field extractor.
///
/// Matches an optional `VAT` / `TAX` / `Tax ID` label followed by 8-15
/// uppercase letters or digits. The match span covers the label so the
/// whole token can be removed from the residual text.
pub struct TaxIdExtractor;

impl TaxIdExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TaxIdExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TaxIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TAX_ID
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let value = caps.get(1)?;
                let label = text[full.start()..value.start()].trim_matches(|c: char| c.is_whitespace() || c == ':');
                let confidence = if label.is_empty() { 0.6 } else { 0.9 };

                Some(
                    ExtractionMatch::new(value.as_str().trim().to_string(), confidence, full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract the first tax ID from text.
pub fn extract_tax_id(text: &str) -> Option<String> {
    TaxIdExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_tax_id() {
        let m = TaxIdExtractor::new().extract("Acme GmbH\nVAT: DE123456789\nBerlin").unwrap();
        assert_eq!(m.value, "DE123456789");
        assert_eq!(m.source, "VAT: DE123456789");
        assert!(m.confidence > 0.8);
    }

    #[test]
    fn test_tax_id_label_variants() {
        assert_eq!(extract_tax_id("Tax ID: GB987654321"), Some("GB987654321".to_string()));
        assert_eq!(extract_tax_id("tax: 91440300MA5"), Some("91440300MA5".to_string()));
        assert_eq!(extract_tax_id("税号: 91440300MA5FXXX"), Some("91440300MA5FXXX".to_string()));
    }

    #[test]
    fn test_unlabeled_tax_id_has_lower_confidence() {
        let m = TaxIdExtractor::new().extract("ref FR40303265045 attached").unwrap();
        assert_eq!(m.value, "FR40303265045");
        assert!(m.confidence < 0.8);
    }

    #[test]
    fn test_lowercase_words_are_not_tax_ids() {
        assert_eq!(extract_tax_id("Springfield, Massachusetts"), None);
        assert_eq!(extract_tax_id("ABC 1234567"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract_tax_id("VAT DE111111111 / VAT DE222222222"),
            Some("DE111111111".to_string())
        );
    }
}
