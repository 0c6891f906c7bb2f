use shield_core::error::{Result, ShieldError};
use shield_core::ExportArtifact;
use wasm_bindgen::{JsCast, JsValue};

fn js_err(e: JsValue) -> ShieldError {
    ShieldError::Export(format!("download: {e:?}"))
}

/// Hand the artifact to the browser as a file download.
pub fn save(artifact: &ExportArtifact) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| ShieldError::Export("window not available".into()))?;
    let document = window
        .document()
        .ok_or_else(|| ShieldError::Export("document not available".into()))?;

    let bytes = js_sys::Uint8Array::from(artifact.bytes.as_slice());
    let parts = js_sys::Array::new();
    parts.push(&bytes);
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(artifact.mime);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| ShieldError::Export("anchor element cast failed".into()))?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url).map_err(js_err)
}
