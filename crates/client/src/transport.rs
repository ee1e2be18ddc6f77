//! Transport port and its HTTP adapter.
//!
//! The port moves one JSON request to the engine and hands back the JSON
//! envelope. It knows nothing about which operation it carries, so retry
//! wraps it once for every mutation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use gangbook_domain::UserId;
use gangbook_shared::USER_ID_HEADER;

use crate::error::ClientError;

/// Header the engine logs and echoes back for one logical call.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// One call to the engine. Retries reuse the same correlation id.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    pub correlation_id: Uuid,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body: Some(body),
            correlation_id: Uuid::new_v4(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GatewayPort: Send + Sync {
    /// Send the request and return the response envelope as JSON.
    async fn execute(&self, request: &ApiRequest) -> Result<Value, ClientError>;
}

/// Engine client over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    user_id: UserId,
}

impl HttpGateway {
    pub fn new(base_url: Url, user_id: UserId) -> Self {
        Self::with_timeout(base_url, user_id, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: Url, user_id: UserId, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url,
            user_id,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::Transport(format!("bad path {path}: {e}")))
    }
}

#[async_trait]
impl GatewayPort for HttpGateway {
    async fn execute(&self, request: &ApiRequest) -> Result<Value, ClientError> {
        let url = self.url(&request.path)?;
        let builder = match request.method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };
        let mut builder = builder
            .header(USER_ID_HEADER, self.user_id.to_string())
            .header(CORRELATION_ID_HEADER, request.correlation_id.to_string());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_join_under_base() {
        let gateway = HttpGateway::new(
            Url::parse("http://localhost:3000/").unwrap(),
            UserId::new(),
        );
        let url = gateway.url("/api/fighters/abc/xp").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/fighters/abc/xp");
    }

    #[test]
    fn requests_get_fresh_correlation_ids() {
        let a = ApiRequest::get("/api/health");
        let b = ApiRequest::get("/api/health");
        assert_ne!(a.correlation_id, b.correlation_id);
        assert!(a.body.is_none());
    }
}
