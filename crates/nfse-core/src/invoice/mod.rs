//! Invoice record extraction from NFS-e XML.

pub mod amounts;
mod extractor;
pub mod fields;

pub use amounts::{format_decimal, format_value, parse_value};
pub use extractor::{NfseExtractor, XmlDocument};

use crate::models::record::ExtractionRecord;

/// Trait for per-document record extractors.
///
/// Extraction never fails: unreadable documents and missing fields are
/// represented inside the record.
pub trait RecordExtractor {
    /// Extract one record from one document.
    fn extract_document(&self, document: &XmlDocument) -> ExtractionRecord;

    /// Extract one record per document, preserving input order.
    fn extract(&self, documents: &[XmlDocument]) -> Vec<ExtractionRecord> {
        documents
            .iter()
            .map(|document| self.extract_document(document))
            .collect()
    }
}
