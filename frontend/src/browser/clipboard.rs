use wasm_bindgen_futures::JsFuture;

use crate::errors::ClientError;

/// Writes `text` to the system clipboard.
pub async fn write_text(text: &str) -> Result<(), ClientError> {
    let window = web_sys::window().ok_or_else(|| ClientError::Clipboard("no window".into()))?;
    let promise = window.navigator().clipboard().write_text(text);
    JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(|e| ClientError::Clipboard(format!("{e:?}")))
}
