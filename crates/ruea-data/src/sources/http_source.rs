//! HTTP transport backed by reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use ruea_core::QueryParams;
use serde_json::Value;

use super::Transport;
use crate::RequestError;

/// Version prefix of every endpoint
pub const API_PREFIX: &str = "/api/v1";

/// Transport issuing real HTTP requests
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the API served at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RequestError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying client, shared with downloads
    pub fn client(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for an endpoint with its query string
    pub fn endpoint_url(&self, path: &str, params: &QueryParams) -> Result<Url, RequestError> {
        endpoint_url(&self.base_url, path, params)
    }
}

/// Absolute URL for `path` under the versioned API of `base_url`
pub fn endpoint_url(base_url: &str, path: &str, params: &QueryParams) -> Result<Url, RequestError> {
    let raw = format!("{}{}{}", base_url.trim_end_matches('/'), API_PREFIX, path);
    let mut url = Url::parse(&raw)
        .map_err(|e| RequestError::Transport(format!("Invalid URL '{}': {}", raw, e)))?;

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }

    Ok(url)
}

/// Extract the `detail` message of an error body, if it is JSON
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, params: &QueryParams) -> Result<Value, RequestError> {
        let url = self.endpoint_url(path, params)?;
        tracing::debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            tracing::warn!(status = status.as_u16(), path, "Request failed");
            return Err(RequestError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn source_name(&self) -> &str {
        &self.base_url
    }
}
