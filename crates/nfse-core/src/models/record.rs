//! Extraction records produced per XML document.

use serde::{Deserialize, Serialize};

/// Sentinel for a field that could not be located.
pub const NOT_FOUND: &str = "Não encontrado";

/// Prefix of the marker stored when a document cannot be read.
pub const READ_ERROR: &str = "Erro de leitura";

/// Outcome of reading a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// The document parsed; individual fields may still be "not found".
    Extracted,
    /// The document could not be parsed.
    ReadError,
}

/// Fields extracted from one document.
///
/// Every field always holds a printable string: the located text, the
/// "not found" sentinel, or (for unreadable documents) an error marker in
/// `number` and empty `value`/`description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Source label, usually the file name.
    pub source: String,

    /// Invoice number (`Numero`).
    pub number: String,

    /// Base value (`BaseCalculo`), two decimals with a comma when numeric.
    pub value: String,

    /// Cleaned service description (`Discriminacao`), one service per line.
    pub description: String,

    pub status: RecordStatus,
}

impl ExtractionRecord {
    /// Record for a document that could not be parsed.
    pub fn read_error(source: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            number: marker.into(),
            value: String::new(),
            description: String::new(),
            status: RecordStatus::ReadError,
        }
    }

    pub fn is_read_error(&self) -> bool {
        self.status == RecordStatus::ReadError
    }
}

/// Records for a batch plus the services found across all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One record per input document, in input order.
    pub records: Vec<ExtractionRecord>,

    /// Sorted, deduplicated description lines from every record.
    pub services: Vec<String>,
}

impl BatchReport {
    pub fn failed(&self) -> impl Iterator<Item = &ExtractionRecord> {
        self.records.iter().filter(|r| r.is_read_error())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}
