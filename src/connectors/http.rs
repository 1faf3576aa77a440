use super::errors::ConnectorError;
use reqwest::RequestBuilder;
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ConnectorError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .build()
        .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))
}

/// Sends the request once and decodes a JSON body. Non-success statuses are
/// turned into a [`ConnectorError`] carrying the status and the raw body.
pub(crate) async fn send_json(
    service: &'static str,
    request: RequestBuilder,
    span: tracing::Span,
) -> Result<Value, ConnectorError> {
    let (status, text) = send_text(request, span).await?;

    if !(200..300).contains(&status) {
        tracing::error!(service, status, body = %text, "upstream request failed");
        return Err(ConnectorError::from_status(service, status, text));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&text).map_err(|_| ConnectorError::InvalidResponse(text))
}

/// Sends the request and returns the status with the body text, whatever the status.
pub(crate) async fn send_text(
    request: RequestBuilder,
    span: tracing::Span,
) -> Result<(u16, String), ConnectorError> {
    let response = request.send().instrument(span).await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    Ok((status, text))
}

pub(crate) fn str_field(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub(crate) fn f64_field(item: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| {
        let value = item.get(*key)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
    })
}

pub(crate) fn bool_field(item: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(|v| v.as_bool()))
}
