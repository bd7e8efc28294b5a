//! HTTP gateway backed by `reqwest`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiSettings;
use crate::error::{ClientError, ClientResult, ErrorDetail, GatewayError};
use crate::gateway::{Encoding, Gateway, GatewayRequest, Method};
use crate::session::Session;

/// Talks to the console API over HTTP.
///
/// Every request carries `Authorization: Bearer <token>` while the session
/// holds one. A `401` ends the session before the failure is reported.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl HttpGateway {
    pub fn new(settings: &ApiSettings, session: Arc<Session>) -> ClientResult<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(HttpGateway {
            client,
            base_url,
            session,
        })
    }

    /// Joins `path` onto the base URL, keeping the base's own path prefix
    /// (`/api/v1` + `/categories` → `/api/v1/categories`).
    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send(&self, request: GatewayRequest) -> Result<Value, GatewayError> {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, %url, "Sending API request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = match request.encoding {
                Encoding::Json => builder.json(body),
                Encoding::Form => builder.form(body),
            };
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "API answered 401, ending session");
            self.session.end();
        }

        // Error bodies that are not JSON carry no usable detail
        let detail = serde_json::from_slice::<Value>(&bytes)
            .map(|body| ErrorDetail::from_body(&body))
            .unwrap_or_default();

        Err(GatewayError::Rejected {
            status: status.as_u16(),
            detail,
        })
    }
}
