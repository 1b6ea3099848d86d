//! Data models for the invoice form.

pub mod config;
pub mod customer;
pub mod invoice;
