//! The network seam under `ApiClient`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::debug;

use super::{ApiError, GraphqlRequest};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Status and body of one completed exchange.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one GraphQL request and returns whatever the server answered.
/// Implementations do not interpret the body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &GraphqlRequest,
        token: Option<&str>,
    ) -> Result<RawReply, ApiError>;
}

/// `reqwest`-backed transport posting to a single endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &GraphqlRequest,
        token: Option<&str>,
    ) -> Result<RawReply, ApiError> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .json(request);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ApiError::Unreachable(e.to_string())
            } else {
                ApiError::NetworkError(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(operation = request.operation.field(), status, "Response received");
        Ok(RawReply { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_reply_success_range() {
        assert!(RawReply { status: 200, body: String::new() }.is_success());
        assert!(RawReply { status: 204, body: String::new() }.is_success());
        assert!(!RawReply { status: 401, body: String::new() }.is_success());
    }

    #[test]
    fn test_http_transport_keeps_endpoint() {
        let transport = HttpTransport::new("http://localhost:8080/graphql").unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8080/graphql");
    }
}
