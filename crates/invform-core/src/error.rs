//! Error types for the invform-core library.

use thiserror::Error;

/// Main error type for the invform library.
#[derive(Error, Debug)]
pub enum InvformError {
    /// Customer info extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// PDF rendering error.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invoice form could not be decoded.
    #[error("invalid invoice form: {0}")]
    Form(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to customer info extraction.
///
/// The extractor itself is total; these are raised only by the
/// paste-handling helpers that sit in front of it.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// Nothing but whitespace was pasted.
    #[error("pasted text is empty")]
    EmptyInput,
}

/// Errors related to PDF rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The invoice failed presence validation.
    #[error("invoice is incomplete: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// PDF object construction failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Writing the PDF bytes failed.
    #[error("failed to write PDF: {0}")]
    Write(#[from] std::io::Error),
}

/// Errors related to configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for the invform library.
pub type Result<T> = std::result::Result<T, InvformError>;
