use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bnc_ratelimit::WeightBudget;
use bytes::Bytes;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::header::RETRY_AFTER;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::errors::ApiError;
use crate::errors::Result;
use crate::errors::TransportError;
use crate::outcome::Outcome;
use crate::outcome::Warning;
use crate::outcome::WarningKind;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;
use crate::transport::TransportRequest;
use crate::transport::TransportResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Header carrying the API key
pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-mbx-apikey");

/// Opaque API credential attached to every request
///
/// Never printed: `Debug` is redacted and the header value is marked sensitive.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.0).map_err(|_| ApiError::InvalidRequest("API key is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// One logical call: endpoint, query and its published weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    endpoint: String,
    params: BTreeMap<String, String>,
    weight: u32,
}

impl CallSpec {
    pub fn new(endpoint: impl Into<String>, weight: u32) -> Self {
        Self { endpoint: endpoint.into(), params: BTreeMap::new(), weight }
    }

    /// Set a query parameter, replacing any previous value for `key`
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Set a query parameter only when a value is given
    pub fn param_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// Limits and cooldowns applied by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Weight admitted per window when the gateway creates its own budget (default: 1_100)
    pub weight_limit: u32,

    /// Budget window length (default: 60s)
    pub window: Duration,

    /// Wait suggested after a 403 edge rejection (default: 60s)
    pub edge_cooldown: Duration,

    /// Wait suggested after a transport failure (default: 10s)
    pub transport_backoff: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            weight_limit: bnc_ratelimit::exchanges::binance::SPOT_WEIGHT_LIMIT,
            window: bnc_ratelimit::exchanges::binance::SPOT_WEIGHT_WINDOW,
            edge_cooldown: Duration::from_secs(60),
            transport_backoff: Duration::from_secs(10),
        }
    }
}

/// Executes calls under a shared weight budget and classifies the responses
///
/// Never retries and never sleeps: every call yields exactly one [`Outcome`]
/// and any waiting is left to the caller.
pub struct RequestGateway {
    base_url: Url,
    budget: Arc<WeightBudget>,
    transport: Arc<dyn Transport>,
    api_key: Option<HeaderValue>,
    config: GatewayConfig,
}

impl RequestGateway {
    pub fn builder() -> RequestGatewayBuilder {
        RequestGatewayBuilder::default()
    }

    pub fn budget(&self) -> &Arc<WeightBudget> {
        &self.budget
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run one call
    pub async fn execute(&self, call: &CallSpec) -> Outcome<Bytes> {
        if call.weight == 0 {
            return ApiError::InvalidRequest(format!("weight for {} must be positive", call.endpoint)).into();
        }

        let request = match self.request_for(call) {
            Ok(request) => request,
            Err(err) => return err.into(),
        };

        let wait = self.budget.reserve(call.weight);
        if !wait.is_zero() {
            warn!(endpoint = %call.endpoint, weight = call.weight, retry_after = ?wait, "weight budget exhausted");
            let message = format!("budget exhausted, wait {:.1}s before calling {}", wait.as_secs_f64(), call.endpoint);
            return Warning::new(WarningKind::BudgetExhausted, wait, message).into();
        }

        debug!(endpoint = %call.endpoint, weight = call.weight, "sending request");

        match self.transport.send(request).await {
            Ok(response) => self.classify(call, response),
            Err(TransportError::Request(reason)) => {
                warn!(endpoint = %call.endpoint, %reason, "transport failure");
                Warning::new(WarningKind::Transport, self.config.transport_backoff, format!("transport failure: {reason}")).into()
            }
            Err(TransportError::Body(reason)) => {
                error!(endpoint = %call.endpoint, %reason, "failed to read response body");
                ApiError::Body(reason).into()
            }
        }
    }

    /// Target URL for `call`: base URL, endpoint path appended to its path, encoded query
    ///
    /// The endpoint must be an absolute path. Anything that would leave the base
    /// origin or its path prefix is rejected, so the API key never reaches another host.
    pub fn url_for(&self, call: &CallSpec) -> Result<Url> {
        let endpoint = call.endpoint.as_str();
        let bad_endpoint = |reason: &str| ApiError::InvalidRequest(format!("bad endpoint {endpoint}: {reason}"));

        if !endpoint.starts_with('/') || endpoint.starts_with("//") {
            return Err(bad_endpoint("must be a path starting with a single '/'"));
        }
        if endpoint.contains(['?', '#', '\\']) {
            return Err(bad_endpoint("query, fragment and backslash are not allowed"));
        }

        let base_path = self.base_url.path().trim_end_matches('/');
        let raw = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&raw).map_err(|err| bad_endpoint(&err.to_string()))?;

        if url.origin() != self.base_url.origin() {
            return Err(bad_endpoint("leaves the base origin"));
        }
        if !url.path().strip_prefix(base_path).is_some_and(|rest| rest.len() > 1 && rest.starts_with('/')) {
            return Err(bad_endpoint("leaves the base path"));
        }

        if !call.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&call.params);
        }

        Ok(url)
    }

    fn request_for(&self, call: &CallSpec) -> Result<TransportRequest> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert(API_KEY_HEADER, api_key.clone());
        }

        Ok(TransportRequest { method: Method::GET, url: self.url_for(call)?, headers })
    }

    fn classify(&self, call: &CallSpec, response: TransportResponse) -> Outcome<Bytes> {
        match response.status {
            StatusCode::OK => Outcome::Success(response.body),
            StatusCode::TOO_MANY_REQUESTS => {
                // routine under load, so not worth a warn
                let wait = retry_after(&response.headers);
                debug!(endpoint = %call.endpoint, retry_after = ?wait, "rate limited by remote");
                let message = format!("status 429 received, API asks to wait {}s", wait.as_secs());
                Warning::new(WarningKind::RateLimited, wait, message).into()
            }
            StatusCode::FORBIDDEN => {
                warn!(endpoint = %call.endpoint, body = %String::from_utf8_lossy(&response.body), "edge rejection");
                Warning::new(WarningKind::EdgeRejection, self.config.edge_cooldown, "edge rejection (status 403)").into()
            }
            status => {
                let body = String::from_utf8_lossy(&response.body).into_owned();
                error!(endpoint = %call.endpoint, %status, %body, "unexpected status");
                ApiError::Status { status, body }.into()
            }
        }
    }
}

impl fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.base_url.as_str())
            .field("budget", &self.budget)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// `Retry-After` in whole seconds; absent or unparseable means no wait
fn retry_after(headers: &HeaderMap) -> Duration {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|text| text.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::ZERO)
}

/// Builder for configuring a request gateway
#[derive(Default)]
pub struct RequestGatewayBuilder {
    base_url: Option<String>,
    budget: Option<Arc<WeightBudget>>,
    transport: Option<Arc<dyn Transport>>,
    api_key: Option<ApiKey>,
    config: GatewayConfig,
}

impl RequestGatewayBuilder {
    /// Set the base authority, e.g. `https://api.binance.com`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Share an existing budget instead of creating one from the config
    pub fn budget(mut self, budget: Arc<WeightBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<RequestGateway> {
        let raw_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw_url).map_err(|err| ApiError::InvalidRequest(format!("bad base url {raw_url}: {err}")))?;
        if base_url.cannot_be_a_base() || base_url.query().is_some() || base_url.fragment().is_some() {
            return Err(ApiError::InvalidRequest(format!("base url {raw_url} must be a plain http(s) authority with optional path")));
        }

        let budget = match self.budget {
            Some(budget) => budget,
            None => Arc::new(WeightBudget::new(self.config.weight_limit, self.config.window)?),
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let api_key = self.api_key.as_ref().map(ApiKey::header_value).transpose()?;

        Ok(RequestGateway { base_url, budget, transport, api_key, config: self.config })
    }
}
