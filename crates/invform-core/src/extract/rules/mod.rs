//! Rule-based field extractors for pasted customer details.

pub mod country;
pub mod email;
pub mod patterns;
pub mod phone;
pub mod postal;
pub mod tax_id;

pub use country::{country_code, detect_country, CountryExtractor, CountryMatch, CountryPattern, COUNTRY_PATTERNS};
pub use email::{extract_email, EmailExtractor};
pub use patterns::*;
pub use phone::{extract_phone, PhoneExtractor};
pub use postal::{extract_postal_code, PostalCodeExtractor};
pub use tax_id::{extract_tax_id, TaxIdExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A located field value with a confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span of the whole match (label included) in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
