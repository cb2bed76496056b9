//! NFS-e record extractor built on the tolerant field locator.

use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::record::{BatchReport, ExtractionRecord, RecordStatus, NOT_FOUND, READ_ERROR};
use crate::text::{clean_description, collect_services};
use crate::xml::{Element, FieldLocator};

use super::amounts::format_value;
use super::fields::{
    DESCRIPTION_QUERY, NUMBER_QUERY, VALUE_CONTAINERS, VALUE_FIELD, VALUE_QUERY,
};
use super::RecordExtractor;

/// A labelled XML document, as raw bytes.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Source label (file name).
    pub label: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Why the bytes could not be obtained, when they could not.
    pub read_failure: Option<String>,
}

impl XmlDocument {
    pub fn new(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
            read_failure: None,
        }
    }

    /// A document whose bytes could not be read (I/O or archive error).
    ///
    /// It still yields a record, marked as a read error.
    pub fn unreadable(label: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self {
            label: label.into(),
            bytes: Vec::new(),
            read_failure: Some(reason.to_string()),
        }
    }
}

/// Fields located in one parsed document.
struct LocatedFields {
    number: Option<String>,
    value: Option<String>,
    services: Vec<String>,
}

/// Extracts `Numero`, `BaseCalculo` and `Discriminacao` from NFS-e XML.
#[derive(Debug, Clone)]
pub struct NfseExtractor {
    /// Text stored for missing fields.
    not_found_label: String,
    /// Prefix of the unreadable-document marker.
    read_error_label: String,
}

impl NfseExtractor {
    /// Create an extractor with the default pt-BR labels.
    pub fn new() -> Self {
        Self {
            not_found_label: NOT_FOUND.to_string(),
            read_error_label: READ_ERROR.to_string(),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_not_found_label(&config.not_found_label)
            .with_read_error_label(&config.read_error_label)
    }

    /// Set the "not found" sentinel.
    pub fn with_not_found_label(mut self, label: impl Into<String>) -> Self {
        self.not_found_label = label.into();
        self
    }

    /// Set the unreadable-document marker prefix.
    pub fn with_read_error_label(mut self, label: impl Into<String>) -> Self {
        self.read_error_label = label.into();
        self
    }

    /// Extract a record from an already parsed tree.
    pub fn extract_tree(&self, source: &str, root: &Element) -> ExtractionRecord {
        self.record_from_tree(source, root).0
    }

    /// Extract records for a batch and gather the services they mention.
    pub fn extract_batch(&self, documents: &[XmlDocument]) -> BatchReport {
        let mut records = Vec::with_capacity(documents.len());
        let mut services = Vec::new();

        for document in documents {
            let (record, found) = self.process(document);
            records.push(record);
            services.extend(found);
        }

        let report = BatchReport {
            records,
            services: collect_services(services),
        };

        info!(
            "Extracted {} records ({} unreadable), {} distinct services",
            report.records.len(),
            report.failed_count(),
            report.services.len()
        );

        report
    }

    fn process(&self, document: &XmlDocument) -> (ExtractionRecord, Vec<String>) {
        if let Some(reason) = &document.read_failure {
            return (self.read_error(&document.label, reason), Vec::new());
        }

        match Element::parse(&document.bytes) {
            Ok(root) => self.record_from_tree(&document.label, &root),
            Err(e) => {
                warn!("Failed to read {}: {}", document.label, e);
                (self.read_error(&document.label, &e), Vec::new())
            }
        }
    }

    fn read_error(&self, label: &str, reason: &dyn std::fmt::Display) -> ExtractionRecord {
        let marker = format!("{}: {}", self.read_error_label, reason);
        ExtractionRecord::read_error(label, marker)
    }

    fn record_from_tree(&self, source: &str, root: &Element) -> (ExtractionRecord, Vec<String>) {
        let fields = locate_fields(root);

        debug!(
            "{}: number={:?} value={:?} services={}",
            source,
            fields.number,
            fields.value,
            fields.services.len()
        );

        let description = if fields.services.is_empty() {
            self.not_found_label.clone()
        } else {
            fields.services.join("\n")
        };

        let record = ExtractionRecord {
            source: source.to_string(),
            number: fields.number.unwrap_or_else(|| self.not_found_label.clone()),
            value: fields.value.unwrap_or_else(|| self.not_found_label.clone()),
            description,
            status: RecordStatus::Extracted,
        };

        (record, fields.services)
    }
}

impl Default for NfseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for NfseExtractor {
    fn extract_document(&self, document: &XmlDocument) -> ExtractionRecord {
        self.process(document).0
    }
}

fn locate_fields(root: &Element) -> LocatedFields {
    let locator = FieldLocator::new(root);

    let number = locator
        .locate_text(&NUMBER_QUERY)
        .map(|text| text.trim().to_string());

    let value = locate_value(&locator).map(|element| format_value(element.text()));

    let services: Vec<String> = locator
        .locate_text(&DESCRIPTION_QUERY)
        .map(|text| clean_description(text.trim()))
        .map(|cleaned| cleaned.lines().map(str::to_string).collect())
        .unwrap_or_default();

    LocatedFields {
        number,
        value,
        services,
    }
}

/// Value lookup: known paths first, then inside a known container.
///
/// Some layouts bury the value several levels below a grouping element
/// whose own name varies between schema versions.
fn locate_value<'a>(locator: &FieldLocator<'a>) -> Option<&'a Element> {
    locator.locate_by_paths(&VALUE_QUERY).or_else(|| {
        VALUE_CONTAINERS.iter().find_map(|name| {
            let container = locator.find_container(name)?;
            locator.locate_within(container, VALUE_FIELD)
        })
    })
}
