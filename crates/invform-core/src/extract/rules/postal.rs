//! Postal code extraction.

use super::patterns::POSTAL_CODE;
use super::{ExtractionMatch, FieldExtractor};

/// Postal code field extractor.
///
/// Recognises US ZIP / ZIP+4, `999 99 99`, `A9A 9A9` and `AA99 99AA`
/// shapes. [`FieldExtractor::extract`] returns the *last* candidate: postal
/// codes trail the address block, while earlier hits tend to be building
/// or suite numbers.
pub struct PostalCodeExtractor;

impl PostalCodeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostalCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PostalCodeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let mut candidates = self.extract_all(text);
        let single = candidates.len() == 1;
        candidates.pop().map(|mut m| {
            if !single {
                m.confidence = 0.6;
            }
            m
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        POSTAL_CODE
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), 0.8, m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extract the last postal code from text.
pub fn extract_postal_code(text: &str) -> Option<String> {
    PostalCodeExtractor::new().extract(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_us_zip() {
        assert_eq!(extract_postal_code("Springfield, IL 62704"), Some("62704".to_string()));
        assert_eq!(extract_postal_code("Austin TX 73301-0001"), Some("73301-0001".to_string()));
    }

    #[test]
    fn test_last_candidate_wins() {
        let text = "Unit 10001, 5 Harbour Rd, Springfield 62704";
        let m = PostalCodeExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, "62704");
        assert_eq!(m.position, Some((text.len() - 5, text.len())));
        assert!(m.confidence < 0.8);
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(extract_postal_code("Toronto ON M5V 3L9"), Some("M5V 3L9".to_string()));
        assert_eq!(extract_postal_code("Box 123 45 67"), Some("123 45 67".to_string()));
        assert_eq!(extract_postal_code("code AB12 34CD"), Some("AB12 34CD".to_string()));
    }

    #[test]
    fn test_code_next_to_cjk_text() {
        assert_eq!(extract_postal_code("东京都港区12345"), Some("12345".to_string()));
        assert_eq!(extract_postal_code("深圳市51800号"), Some("51800".to_string()));
    }

    #[test]
    fn test_longer_digit_runs_rejected() {
        assert_eq!(extract_postal_code("Order 1234567890"), None);
        assert_eq!(extract_postal_code("Tel 555-123-4567"), None);
    }
}
