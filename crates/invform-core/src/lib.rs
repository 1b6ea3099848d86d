//! Core library for the invform invoice form.
//!
//! This crate provides:
//! - Customer info extraction from pasted free text (email, phone, postal
//!   code, tax ID, country, then company/contact/address/city by position)
//! - Invoice form models with totals, presence validation and numbering
//! - PDF rendering of a completed invoice
//! - JSON configuration for seller details and rendering options

pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;

pub use error::{InvformError, Result};
pub use extract::{extract_customer_info, CustomerExtraction, CustomerInfoParser};
pub use models::customer::{CustomerField, CustomerInfo};
pub use models::invoice::{
    generate_invoice_number, Charges, Currency, Invoice, InvoiceHeader, InvoiceSummary, LineItem,
    Unit,
};
pub use pdf::InvoiceRenderer;
