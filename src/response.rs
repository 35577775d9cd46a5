//! Maps an HTTP response to a decoded value or a typed error.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::Error;

/// Successful outcome of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiReply<T> {
    /// 204 No Content. The body is never read.
    Empty,
    Data(T),
}

impl<T> ApiReply<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            ApiReply::Empty => None,
            ApiReply::Data(value) => Some(value),
        }
    }

    /// Returns the payload, failing with `Error::EmptyResponse` on 204.
    pub fn into_data(self) -> Result<T, Error> {
        self.into_option().ok_or(Error::EmptyResponse)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ApiReply::Empty)
    }
}

pub async fn interpret<T: DeserializeOwned>(response: Response) -> Result<ApiReply<T>, Error> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiReply::Empty);
    }
    let body = response.bytes().await?;
    decode(status, &body)
}

/// Status and body half of the policy, separated from the transport.
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<ApiReply<T>, Error> {
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiReply::Empty);
    }
    if status.is_success() {
        return Ok(ApiReply::Data(serde_json::from_slice(body)?));
    }
    let message = error_message(status, body);
    debug!(status = status.as_u16(), message = %message, "response.error");
    Err(Error::Api { status, message })
}

/// Picks `detail`, then `message`, then `"API error: <status>"`.
/// Unparseable bodies are treated as an empty object.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    let payload: serde_json::Value =
        serde_json::from_slice(body).unwrap_or_else(|_| serde_json::json!({}));
    ["detail", "message"]
        .iter()
        .find_map(|field| {
            payload
                .get(*field)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("API error: {}", status.as_u16()))
}
