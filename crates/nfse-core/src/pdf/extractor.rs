//! PDF text extraction using lopdf and pdf-extract.

use std::borrow::Cow;

use lopdf::Document;
use tracing::debug;

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// Extracts the text of service reports saved as PDF.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    /// User password tried on encrypted files; empty by default.
    password: String,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Extract text with the default extractor.
    pub fn text_from_bytes(data: &[u8]) -> Result<String> {
        Self::new().extract_text(data)
    }

    /// Bytes pdf-extract can read: the input itself, or a decrypted copy.
    fn readable<'d>(&self, data: &'d [u8]) -> Result<Cow<'d, [u8]>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let pages = doc.get_pages().len();
        if pages == 0 {
            return Err(PdfError::NoPages);
        }
        debug!("PDF has {} pages", pages);

        if !doc.is_encrypted() {
            return Ok(Cow::Borrowed(data));
        }

        doc.decrypt(self.password.as_str())
            .map_err(|_| PdfError::Encrypted)?;

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("cannot re-save decrypted PDF: {}", e)))?;
        debug!("Decrypted PDF ({} bytes)", decrypted.len());
        Ok(Cow::Owned(decrypted))
    }
}

impl PdfProcessor for PdfExtractor {
    fn extract_text(&self, data: &[u8]) -> Result<String> {
        let bytes = self.readable(data)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        debug!("Extracted {} characters of text", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ServiceListWriter;
    use crate::text::normalize_services;

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            PdfExtractor::text_from_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_rendered_service_list_reads_back() {
        let services = vec!["CONSULTA GERAL".to_string(), "EXAME SANGUE".to_string()];
        let bytes = ServiceListWriter::new("Lista").render(&services).unwrap();

        let text = PdfExtractor::text_from_bytes(&bytes).unwrap();
        let found = normalize_services(&text);

        for service in &services {
            assert!(found.contains(service), "{service} missing from {found:?}");
        }
    }
}
