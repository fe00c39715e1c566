use serde::de::DeserializeOwned;
use serde_json::Value;
use workshop_core::api::{ApiError, ApiErrorKind};

const BODY_PREVIEW_LIMIT: usize = 512;

pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> ApiError {
    let kind = if err.is_timeout() {
        ApiErrorKind::Timeout
    } else if err.is_connect() {
        ApiErrorKind::Connect
    } else if err.is_request() {
        ApiErrorKind::Request
    } else if err.is_body() {
        ApiErrorKind::Body
    } else if err.is_decode() {
        ApiErrorKind::Decode
    } else {
        ApiErrorKind::Unknown
    };
    let mut api_err = ApiError::new(kind, err.to_string()).with_url(url);
    if let Some(status) = err.status() {
        api_err = api_err.with_status(status.as_u16());
    }
    api_err.with_source(anyhow::Error::new(err))
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}

/// The `detail` field of an error body. Structured details (validation
/// errors) are passed on as compact JSON.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) async fn parse_json_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp.text().await.map_err(|err| from_reqwest(err, &url))?;

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        return Err(ApiError::rejected(
            status.as_u16(),
            url,
            extract_detail(&body),
            reason,
        ));
    }

    serde_json::from_str::<T>(&body).map_err(|err| {
        let message = format!(
            "failed to decode response body: {} | body={}",
            err,
            preview_body(&body)
        );
        ApiError::new(ApiErrorKind::Decode, message)
            .with_status(status.as_u16())
            .with_url(url)
            .with_source(anyhow::Error::new(err))
    })
}
