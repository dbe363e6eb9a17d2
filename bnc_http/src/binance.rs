use std::sync::Arc;

use bnc_ratelimit::WeightBudget;
use serde::Deserialize;

use crate::client::HttpClientConfig;
use crate::errors::ApiError;
use crate::errors::Result;
use crate::gateway::ApiKey;
use crate::gateway::CallSpec;
use crate::gateway::GatewayConfig;
use crate::gateway::RequestGateway;
use crate::outcome::Outcome;
use crate::serde_helpers::PriceLevel;
use crate::transport::ReqwestTransport;
use crate::transport::Transport;

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const BINANCE_TESTNET_URL: &str = "https://testnet.binance.vision";

/// Allowed `limit` values for the depth endpoint, each with its own weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthLimit {
    L5,
    L10,
    L20,
    L50,
    L100,
    L500,
    L1000,
    L5000,
}

impl DepthLimit {
    pub fn value(self) -> u16 {
        match self {
            DepthLimit::L5 => 5,
            DepthLimit::L10 => 10,
            DepthLimit::L20 => 20,
            DepthLimit::L50 => 50,
            DepthLimit::L100 => 100,
            DepthLimit::L500 => 500,
            DepthLimit::L1000 => 1000,
            DepthLimit::L5000 => 5000,
        }
    }

    pub fn weight(self) -> u32 {
        match self {
            DepthLimit::L5 | DepthLimit::L10 | DepthLimit::L20 | DepthLimit::L50 | DepthLimit::L100 => 1,
            DepthLimit::L500 => 5,
            DepthLimit::L1000 => 10,
            DepthLimit::L5000 => 50,
        }
    }
}

impl TryFrom<u16> for DepthLimit {
    type Error = ApiError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            5 => Ok(DepthLimit::L5),
            10 => Ok(DepthLimit::L10),
            20 => Ok(DepthLimit::L20),
            50 => Ok(DepthLimit::L50),
            100 => Ok(DepthLimit::L100),
            500 => Ok(DepthLimit::L500),
            1000 => Ok(DepthLimit::L1000),
            5000 => Ok(DepthLimit::L5000),
            other => Err(ApiError::InvalidRequest(format!("depth limit {other} is not one of 5, 10, 20, 50, 100, 500, 1000, 5000"))),
        }
    }
}

/// Optional filters for the aggregated trades endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggTradesQuery {
    pub from_id: Option<u64>,
    pub start_time_ms: Option<u64>,
    pub end_time_ms: Option<u64>,
    pub limit: Option<u16>,
}

impl AggTradesQuery {
    pub fn from_id(mut self, from_id: u64) -> Self {
        self.from_id = Some(from_id);
        self
    }

    pub fn between(mut self, start_time_ms: u64, end_time_ms: u64) -> Self {
        self.start_time_ms = Some(start_time_ms);
        self.end_time_ms = Some(end_time_ms);
        self
    }

    pub fn limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Binance spot market-data client
///
/// Every endpoint goes through one [`RequestGateway`], so all calls made by
/// this client (and by any client sharing its budget) count against the same
/// weight window.
#[derive(Debug)]
pub struct BinanceClient {
    gateway: RequestGateway,
}

impl BinanceClient {
    /// Create a new Binance client with default configuration
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> BinanceClientBuilder {
        BinanceClientBuilder::default()
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Budget shared by this client's calls
    pub fn budget(&self) -> &Arc<WeightBudget> {
        self.gateway.budget()
    }

    /// Get server time (weight 1)
    pub async fn server_time(&self) -> Outcome<ServerTime> {
        self.gateway.execute(&CallSpec::new("/api/v3/time", 1)).await.decode()
    }

    /// Get order book depth snapshot
    ///
    /// Weight depends on the requested depth; without a limit the server default applies (weight 1).
    pub async fn order_book(&self, symbol: &str, limit: Option<DepthLimit>) -> Outcome<OrderBook> {
        let weight = limit.map_or(1, DepthLimit::weight);
        let call = CallSpec::new("/api/v3/depth", weight).param("symbol", symbol).param_opt("limit", limit.map(DepthLimit::value));

        self.gateway.execute(&call).await.decode()
    }

    /// Get recent trades (weight 1)
    pub async fn recent_trades(&self, symbol: &str, limit: Option<u16>) -> Outcome<Vec<Trade>> {
        let call = CallSpec::new("/api/v3/trades", 1).param("symbol", symbol).param_opt("limit", limit);

        self.gateway.execute(&call).await.decode()
    }

    /// Get older trades (weight 5)
    pub async fn historical_trades(&self, symbol: &str, limit: Option<u16>, from_id: Option<u64>) -> Outcome<Vec<Trade>> {
        let call = CallSpec::new("/api/v3/historicalTrades", 5).param("symbol", symbol).param_opt("limit", limit).param_opt("fromId", from_id);

        self.gateway.execute(&call).await.decode()
    }

    /// Get compressed, aggregate trades (weight 1)
    pub async fn aggregated_trades(&self, symbol: &str, query: AggTradesQuery) -> Outcome<Vec<AggTrade>> {
        let call = CallSpec::new("/api/v3/aggTrades", 1)
            .param("symbol", symbol)
            .param_opt("fromId", query.from_id)
            .param_opt("startTime", query.start_time_ms)
            .param_opt("endTime", query.end_time_ms)
            .param_opt("limit", query.limit);

        self.gateway.execute(&call).await.decode()
    }
}

/// Builder for configuring Binance client
pub struct BinanceClientBuilder {
    http_config: HttpClientConfig,
    base_url: String,
    gateway_config: GatewayConfig,
    weight_budget: Option<Arc<WeightBudget>>,
    transport: Option<Arc<dyn Transport>>,
    api_key: Option<ApiKey>,
}

impl Default for BinanceClientBuilder {
    fn default() -> Self {
        Self {
            http_config: HttpClientConfig::default(),
            base_url: BINANCE_BASE_URL.to_string(),
            gateway_config: GatewayConfig::default(),
            weight_budget: None,
            transport: None,
            api_key: None,
        }
    }
}

impl BinanceClientBuilder {
    /// Use testnet environment
    pub fn testnet(mut self) -> Self {
        self.base_url = BINANCE_TESTNET_URL.to_string();
        self
    }

    /// Set custom base URL
    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Configure HTTP client settings (ignored when a transport is supplied)
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure budget limits and cooldowns
    pub fn gateway_config(mut self, config: GatewayConfig) -> Self {
        self.gateway_config = config;
        self
    }

    /// Share a weight budget with other clients using the same API key or IP
    pub fn weight_budget(mut self, budget: Arc<WeightBudget>) -> Self {
        self.weight_budget = Some(budget);
        self
    }

    /// Send requests through a custom transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set API key sent as `X-MBX-APIKEY`
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(api_key));
        self
    }

    /// Use low-latency HTTP timeouts
    pub fn low_latency(mut self) -> Self {
        self.http_config = HttpClientConfig::low_latency();
        self
    }

    /// Build the Binance client
    pub fn build(self) -> Result<BinanceClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_config(self.http_config)?),
        };

        let mut gateway = RequestGateway::builder().base_url(self.base_url).transport(transport).config(self.gateway_config);

        if let Some(budget) = self.weight_budget {
            gateway = gateway.budget(budget);
        }
        if let Some(api_key) = self.api_key {
            gateway = gateway.api_key(api_key);
        }

        Ok(BinanceClient { gateway: gateway.build()? })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderBook {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    #[serde(deserialize_with = "crate::serde_helpers::deserialize_price_levels")]
    pub bids: Vec<PriceLevel>,
    #[serde(deserialize_with = "crate::serde_helpers::deserialize_price_levels")]
    pub asks: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trade {
    pub id: u64,
    #[serde(deserialize_with = "crate::serde_helpers::deserialize_decimal_string")]
    pub price: f64,
    #[serde(rename = "qty", deserialize_with = "crate::serde_helpers::deserialize_decimal_string")]
    pub quantity: f64,
    #[serde(rename = "quoteQty", deserialize_with = "crate::serde_helpers::deserialize_decimal_string")]
    pub quote_quantity: f64,
    pub time: u64,
    #[serde(rename = "isBuyerMaker")]
    pub is_buyer_maker: bool,
    #[serde(rename = "isBestMatch")]
    pub is_best_match: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub id: u64,
    #[serde(rename = "p", deserialize_with = "crate::serde_helpers::deserialize_decimal_string")]
    pub price: f64,
    #[serde(rename = "q", deserialize_with = "crate::serde_helpers::deserialize_decimal_string")]
    pub quantity: f64,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub time: u64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
    #[serde(rename = "M")]
    pub is_best_match: bool,
}
