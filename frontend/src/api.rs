use gloo_net::http::Request;

use crate::errors::ClientError;
use crate::models::{AskRequest, AskResponse, ErrorBody};

/// Sends one message to the relay. Every failure (network, non-2xx, bad JSON)
/// comes back as [`ClientError::Upstream`] with a readable message.
pub async fn ask(api_base: &str, message: &str) -> Result<AskResponse, ClientError> {
    let body = AskRequest { message: message.to_string() };

    let resp = Request::post(&format!("{api_base}/ask"))
        .json(&body)
        .map_err(|e| ClientError::Upstream(format!("Serialize error: {e}")))?
        .send()
        .await
        .map_err(|e| ClientError::Upstream(format!("Network error: {e}")))?;

    if !resp.ok() {
        let status = resp.status();
        let detail = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => resp.status_text(),
        };
        return Err(ClientError::Upstream(format!("Server error {status}: {detail}")));
    }

    resp.json::<AskResponse>()
        .await
        .map_err(|e| ClientError::Upstream(format!("Parse error: {e}")))
}
