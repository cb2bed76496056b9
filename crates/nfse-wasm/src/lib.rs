//! WASM bindings for NFS-e service invoice analysis.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use nfse_core::{BatchReport, NfseExtractor, RecordExtractor as _, XmlDocument};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Extract number, value and description from one XML document.
///
/// Unreadable documents still produce a record, with `status` set to
/// `read_error`.
#[wasm_bindgen]
pub fn extract_record(label: &str, xml: &str) -> Result<JsValue, JsValue> {
    RecordExtractor::new().extract(label, xml)
}

/// Split a flattened `Discriminacao` into one service per line.
#[wasm_bindgen]
pub fn clean_description(text: &str) -> String {
    nfse_core::clean_description(text)
}

/// Corrected, deduplicated and sorted service lines.
#[wasm_bindgen]
pub fn normalize_services(text: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&nfse_core::normalize_services(text))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Reformat a numeric value with two decimals and a comma.
#[wasm_bindgen]
pub fn format_value(text: &str) -> String {
    nfse_core::format_value(text)
}

/// A document handed over from JavaScript.
#[derive(Deserialize)]
struct DocumentInput {
    label: String,
    xml: String,
}

/// Record extractor class for browser use.
#[wasm_bindgen]
pub struct RecordExtractor {
    extractor: NfseExtractor,
}

#[wasm_bindgen]
impl RecordExtractor {
    /// Create an extractor with the default labels.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extractor: NfseExtractor::new(),
        }
    }

    /// Text stored for fields that are missing.
    #[wasm_bindgen]
    pub fn set_not_found_label(&mut self, label: &str) {
        self.extractor = self.extractor.clone().with_not_found_label(label);
    }

    /// Prefix of the marker stored for unreadable documents.
    #[wasm_bindgen]
    pub fn set_read_error_label(&mut self, label: &str) {
        self.extractor = self.extractor.clone().with_read_error_label(label);
    }

    /// Extract a record from one document.
    #[wasm_bindgen]
    pub fn extract(&self, label: &str, xml: &str) -> Result<JsValue, JsValue> {
        let record = self
            .extractor
            .extract_document(&XmlDocument::new(label, xml.as_bytes()));

        serde_wasm_bindgen::to_value(&record).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Extract records from a JSON array of `{ "label", "xml" }` objects.
    ///
    /// Returns the batch report (records plus the service list) as JSON.
    #[wasm_bindgen]
    pub fn extract_batch_json(&self, documents: &str) -> Result<String, JsValue> {
        let report = self
            .batch_from_json(documents)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl RecordExtractor {
    fn batch_from_json(&self, documents: &str) -> serde_json::Result<BatchReport> {
        let inputs: Vec<DocumentInput> = serde_json::from_str(documents)?;
        let documents: Vec<XmlDocument> = inputs
            .into_iter()
            .map(|input| XmlDocument::new(input.label, input.xml.into_bytes()))
            .collect();

        Ok(self.extractor.extract_batch(&documents))
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}
