//! Hand a finished archive to the browser as a download.

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// Save `bytes` as `file_name` through a temporary `<a download>` link.
///
/// # Errors
/// Returns an error if there is no document or the DOM calls fail.
#[wasm_bindgen]
pub fn download_archive(bytes: &[u8], file_name: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let props = BlobPropertyBag::new();
    props.set_type("application/zip");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &props)?;

    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.style().set_property("display", "none")?;

    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    Url::revoke_object_url(&url)?;

    log::debug!("offered {file_name} for download ({} bytes)", bytes.len());
    Ok(())
}
