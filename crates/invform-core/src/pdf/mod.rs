//! PDF rendering module.

mod canvas;
mod renderer;

pub use canvas::{encode_win_ansi, Font};
pub use renderer::InvoiceRenderer;

use crate::error::RenderError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, RenderError>;
