//! Browser tests for the JavaScript surface.
//!
//! Run with: wasm-pack test --headless --chrome

#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod fixtures;

use js_sys::Uint8Array;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use xlcsv::Converter;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_add_file_filters_by_extension() {
    let mut converter = Converter::new();
    assert!(converter.add_file("A/a.xlsx".into(), fixtures::xlsx_with_text("a")));
    assert!(!converter.add_file("A/readme.md".into(), b"# hi".to_vec()));
    assert_eq!(converter.file_count(), 1);
    converter.clear();
    assert_eq!(converter.file_count(), 0);
}

#[wasm_bindgen_test]
async fn test_run_resolves_to_zip() {
    let mut converter = Converter::new();
    converter.add_file("A/a.xlsx".into(), fixtures::xlsx_with_text("a"));
    let value = JsFuture::from(converter.run("out".into(), None)).await.unwrap();
    let bytes = Uint8Array::new(&value).to_vec();
    assert_eq!(&bytes[..4], b"PK\x03\x04");
    // Queue is consumed by the run
    assert_eq!(converter.file_count(), 0);
}

#[wasm_bindgen_test]
async fn test_run_rejects_without_files() {
    let mut converter = Converter::new();
    let err = JsFuture::from(converter.run("out".into(), None))
        .await
        .unwrap_err();
    assert!(err.as_string().is_some());
}

#[wasm_bindgen_test]
fn test_set_options_rejects_quote_delimiter() {
    let mut converter = Converter::new();
    let options = js_sys::JSON::parse(r#"{"csv":{"delimiter":"\""}}"#).unwrap();
    assert!(converter.set_options(options).is_err());
    assert!(converter.set_options(JsValue::UNDEFINED).is_ok());
}
