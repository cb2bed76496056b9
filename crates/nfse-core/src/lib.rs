//! Core library for NFS-e (Brazilian electronic service invoice) analysis.
//!
//! This crate provides:
//! - A minimal XML element tree with namespace-resolved names
//! - A tolerant field locator that copes with missing namespaces and
//!   unknown nesting
//! - Record extraction of invoice number, base value and service description
//! - Service description cleanup, spelling correction and deduplication
//! - PDF text extraction and service list rendering (`pdf` feature)

pub mod error;
pub mod invoice;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod text;
pub mod xml;

pub use error::{NfseError, PdfError, Result, XmlError};
pub use invoice::{NfseExtractor, RecordExtractor, XmlDocument, format_value};
pub use models::config::NfseConfig;
pub use models::record::{BatchReport, ExtractionRecord, RecordStatus, NOT_FOUND, READ_ERROR};
#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PdfProcessor, ServiceListWriter};
pub use text::{clean_description, normalize_services, TypoTable};
pub use xml::{Element, FieldLocator, FieldQuery, NamespaceSet, QName};
