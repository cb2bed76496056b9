//! PDF text extraction and service list rendering.

mod extractor;
mod writer;

pub use extractor::PdfExtractor;
pub use writer::ServiceListWriter;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Extract the text of every page of the PDF in `data`.
    fn extract_text(&self, data: &[u8]) -> Result<String>;
}
