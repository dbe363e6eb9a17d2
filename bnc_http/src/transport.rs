use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::HeaderMap;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::errors::Result;
use crate::errors::TransportError;

/// Fully built outbound request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

/// Raw response as received, before classification
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self { status, headers: HeaderMap::new(), body: body.into() }
    }
}

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = std::result::Result<TransportResponse, TransportError>> + Send + 'a>>;

/// Stateless HTTP transport the gateway sends requests through
///
/// Implementations must eventually resolve; timeout policy is their concern.
pub trait Transport: Send + Sync {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Transport backed by a reqwest client
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Ok(Self { client: HttpClient::with_config(config)? })
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .inner()
                .request(request.method, request.url)
                .headers(request.headers)
                .send()
                .await
                .map_err(|err| TransportError::Request(err.to_string()))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(body_error)?;

            Ok(TransportResponse { status, headers, body })
        })
    }
}

/// A timeout while streaming the body is as retryable as one before the headers
fn body_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Request(format!("timed out reading body: {err}"))
    } else {
        TransportError::Body(err.to_string())
    }
}
