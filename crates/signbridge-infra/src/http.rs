//! Response handling shared by the upstream clients.

use serde::de::DeserializeOwned;

use signbridge_types::error::UpstreamError;

pub(crate) fn transport(service: &'static str, e: reqwest::Error) -> UpstreamError {
    UpstreamError::Transport {
        service,
        message: e.to_string(),
    }
}

pub(crate) fn decode(service: &'static str, message: impl Into<String>) -> UpstreamError {
    UpstreamError::Decode {
        service,
        message: message.into(),
    }
}

/// Turn a non-2xx response into [`UpstreamError::Status`] carrying the body.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let response = ensure_success(service, response).await?;
    response
        .json()
        .await
        .map_err(|e| decode(service, format!("failed to parse response: {e}")))
}

/// Read the body, failing once it grows past `max_bytes`.
pub(crate) async fn read_bytes_capped(
    service: &'static str,
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, UpstreamError> {
    let mut response = ensure_success(service, response).await?;
    if let Some(len) = response.content_length().filter(|len| *len > max_bytes) {
        return Err(decode(
            service,
            format!("response of {len} bytes exceeds the {max_bytes} byte limit"),
        ));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| transport(service, e))? {
        if (body.len() + chunk.len()) as u64 > max_bytes {
            return Err(decode(
                service,
                format!("response exceeds the {max_bytes} byte limit"),
            ));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Render a JSON id (number or string) as a string.
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
