//! Error types for the nfse-core library.

use thiserror::Error;

/// Main error type for the nfse library.
#[derive(Error, Debug)]
pub enum NfseError {
    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building an element tree from XML bytes.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The underlying reader rejected the input.
    #[error("malformed XML: {0}")]
    Malformed(String),

    /// An element uses a namespace prefix that was never declared.
    #[error("unbound namespace prefix: {0}")]
    UnboundPrefix(String),

    /// The document ended with elements still open.
    #[error("unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// The document has no root element.
    #[error("document has no root element")]
    NoRoot,

    /// Content found after the root element was closed.
    #[error("multiple root elements: <{0}>")]
    MultipleRoots(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to write a PDF report.
    #[error("failed to write PDF: {0}")]
    Write(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Result type for the nfse library.
pub type Result<T> = std::result::Result<T, NfseError>;
