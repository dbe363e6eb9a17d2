//! # bnc_http
//!
//! Weight-budgeted REST gateway and typed Binance market-data client

pub mod binance;
pub mod client;
pub mod errors;
pub mod gateway;
pub mod marshal;
pub mod outcome;
pub mod serde_helpers;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use binance::BinanceClient;
pub use binance::BinanceClientBuilder;
pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use errors::ApiError;
pub use errors::Result;
pub use errors::TransportError;
pub use gateway::ApiKey;
pub use gateway::CallSpec;
pub use gateway::GatewayConfig;
pub use gateway::RequestGateway;
pub use outcome::Outcome;
pub use outcome::Warning;
pub use outcome::WarningKind;
pub use transport::ReqwestTransport;
pub use transport::Transport;
