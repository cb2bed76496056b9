//! Bindings exercised through JS values; run with `wasm-pack test --node`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use nfse_core::{ExtractionRecord, RecordStatus};
use nfse_wasm::{extract_record, normalize_services, RecordExtractor};

#[wasm_bindgen_test]
fn test_extract_record_to_js() {
    let value = extract_record(
        "a.xml",
        "<Nfse><Numero>5</Numero><Valores><BaseCalculo>12,5</BaseCalculo></Valores></Nfse>",
    )
    .unwrap();
    let record: ExtractionRecord = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(record.source, "a.xml");
    assert_eq!(record.number, "5");
    assert_eq!(record.value, "12,50");
    assert_eq!(record.status, RecordStatus::Extracted);
}

#[wasm_bindgen_test]
fn test_normalize_services_to_js() {
    let value = normalize_services("exame b\nexame a\nEXAME B").unwrap();
    let services: Vec<String> = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(services, vec!["EXAME A", "EXAME B"]);
}

#[wasm_bindgen_test]
fn test_extractor_labels() {
    let mut extractor = RecordExtractor::new();
    extractor.set_read_error_label("Falha");

    let value = extractor.extract("bad.xml", "<Nfse>").unwrap();
    let record: ExtractionRecord = serde_wasm_bindgen::from_value(value).unwrap();

    assert_eq!(record.status, RecordStatus::ReadError);
    assert!(record.number.starts_with("Falha: "));
}
