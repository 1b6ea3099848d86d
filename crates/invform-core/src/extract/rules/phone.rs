//! Phone number extraction.

use super::patterns::PHONE;
use super::{ExtractionMatch, FieldExtractor};

/// Phone field extractor.
///
/// An optional `Phone` / `Tel` / `Telephone` / `Mobile` label is part of
/// the match span but not of the value.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        PHONE
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let number = caps.get(1)?;
                let labeled = !text[full.start()..number.start()]
                    .trim_matches(|c: char| c.is_whitespace() || c == ':')
                    .is_empty();

                Some(
                    ExtractionMatch::new(
                        number.as_str().trim().to_string(),
                        if labeled { 0.9 } else { 0.7 },
                        full.as_str(),
                    )
                    .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract the first phone number from text.
pub fn extract_phone(text: &str) -> Option<String> {
    PhoneExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_phone() {
        let m = PhoneExtractor::new().extract("Acme, Tel: 555-123-4567").unwrap();
        assert_eq!(m.value, "555-123-4567");
        assert_eq!(m.source, "Tel: 555-123-4567");
        assert!(m.confidence > 0.8);
    }

    #[test]
    fn test_label_variants() {
        assert_eq!(extract_phone("Telephone: 020 7946 0958"), Some("020 7946 0958".to_string()));
        assert_eq!(extract_phone("Tel 0755-8888(6)12"), Some("0755-8888(6)12".to_string()));
        assert_eq!(extract_phone("MOBILE +44 7700 900123"), Some("+44 7700 900123".to_string()));
        assert_eq!(extract_phone("电话：13800138000"), Some("13800138000".to_string()));
    }

    #[test]
    fn test_trailing_blanks_trimmed() {
        assert_eq!(extract_phone("Phone 555 123 4567   \nNext line"), Some("555 123 4567".to_string()));
    }

    #[test]
    fn test_no_break_spaces_inside_number() {
        assert_eq!(
            extract_phone("Tel: +33\u{a0}1\u{a0}23\u{a0}45\u{a0}67\u{a0}89"),
            Some("+33\u{a0}1\u{a0}23\u{a0}45\u{a0}67\u{a0}89".to_string())
        );
    }

    #[test]
    fn test_short_numbers_ignored() {
        assert_eq!(extract_phone("123 Main St, 62704"), None);
    }
}
