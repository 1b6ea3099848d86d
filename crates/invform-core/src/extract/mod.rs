//! Customer info extraction from pasted free text.

mod parser;
pub mod rules;

pub use parser::{extract_customer_info, CustomerExtraction, CustomerInfoParser, FieldMatch};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
