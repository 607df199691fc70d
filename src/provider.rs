//! Shared request/response handling for Graph API endpoints.
//!
//! Every call is a GET with query parameters. Responses are classified into
//! transport failures, provider-reported errors, and malformed bodies so each
//! caller can map them onto its own error variant.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Graph API error code for unsupported requests and unknown fields.
pub const UNSUPPORTED_REQUEST_CODE: i64 = 100;

/// Error details reported by the provider in a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub status: u16,
    pub code: Option<i64>,
    pub message: String,
}

impl ProviderFailure {
    /// The provider rejected one of the requested fields.
    pub fn is_unsupported_field(&self) -> bool {
        self.code == Some(UNSUPPORTED_REQUEST_CODE)
            && (self.message.contains("Unsupported get request")
                || self.message.contains("nonexisting field"))
    }

    /// The provider rejected the request as unsupported for this account type.
    pub fn is_unsupported_request(&self) -> bool {
        self.code == Some(UNSUPPORTED_REQUEST_CODE)
            || self.message.contains("Unsupported get request")
    }
}

#[derive(Debug)]
pub enum CallError {
    /// No response was received.
    Network(String),
    /// The provider answered with an error status.
    Provider(ProviderFailure),
    /// A 2xx response whose body could not be interpreted.
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorField,
}

/// Graph errors are objects; some OAuth endpoints answer with a bare string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Detailed {
        message: Option<String>,
        code: Option<i64>,
        #[serde(rename = "type")]
        kind: Option<String>,
    },
    Plain(String),
}

/// Extract the provider's error message (and code) from a failed response body.
pub fn parse_failure(status: u16, body: &str) -> ProviderFailure {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let description = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error_description")
                .or_else(|| v.get("error_message"))
                .and_then(|d| d.as_str().map(String::from))
        });

    let (code, message) = match envelope.map(|e| e.error) {
        Some(ErrorField::Detailed {
            message: Some(message),
            code,
            ..
        }) => (code, message),
        Some(ErrorField::Detailed {
            message: None,
            code,
            kind,
        }) => (code, kind.unwrap_or_else(|| format!("HTTP {status}"))),
        Some(ErrorField::Plain(error)) => (None, description.unwrap_or(error)),
        None => {
            let trimmed = body.trim();
            let message = match description {
                Some(d) => d,
                None if trimmed.is_empty() => format!("HTTP {status}"),
                None => format!("HTTP {status}: {trimmed}"),
            };
            (None, message)
        }
    };

    ProviderFailure {
        status,
        code,
        message,
    }
}

/// Issue a GET and decode a JSON body.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, CallError> {
    tracing::debug!(url, "GET");
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| CallError::Network(e.to_string()))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| CallError::Network(format!("Failed to read response body: {e}")))?;

    if !status.is_success() {
        let failure = parse_failure(status.as_u16(), &body);
        tracing::debug!(url, status = failure.status, code = ?failure.code, "provider error");
        return Err(CallError::Provider(failure));
    }

    serde_json::from_str(&body)
        .map_err(|e| CallError::Malformed(format!("Unexpected response from {url}: {e}")))
}
