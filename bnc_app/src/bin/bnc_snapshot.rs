use std::time::Duration;

use bnc_app::cli;
use bnc_app::config_loader;
use bnc_app::retry::with_retries;
use bnc_app::shutdown_handler;
use bnc_app::time_utils;
use bnc_app::tracing_setup;
use bnc_http::BinanceClient;
use bnc_http::Outcome;
use bnc_http::binance::AggTradesQuery;
use bnc_http::binance::DepthLimit;
use tracing::Level;
use tracing::info;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/bnc_snapshot.toml";

/// Unwrap a settled outcome: data on success, `None` if still deferred, `Err` on failure
fn settle<T>(what: &str, outcome: Outcome<T>) -> anyhow::Result<Option<T>> {
    match outcome {
        Outcome::Success(value) => Ok(Some(value)),
        Outcome::Warning(warning) => {
            warn!("Skipping {what}: {warning}");
            Ok(None)
        }
        Outcome::Error(err) => Err(anyhow::anyhow!("{what} failed: {err}")),
    }
}

async fn snapshot(client: &BinanceClient, symbol: &str, max_attempts: u32) -> anyhow::Result<()> {
    if let Some(time) = settle("server time", with_retries(max_attempts, move || client.server_time()).await)? {
        let skew = time_utils::clock_skew_ms(time.server_time, time_utils::unix_timestamp_ms());
        info!("Server time {} (local clock skew {skew} ms)", time.server_time);
    }

    // 4 most recent aggregated trades
    let query = AggTradesQuery::default().limit(4);
    if let Some(trades) = settle("aggregated trades", with_retries(max_attempts, move || client.aggregated_trades(symbol, query)).await)? {
        for (i, trade) in trades.iter().enumerate() {
            info!("Aggregated trade #{i}: {trade:?}");
        }
    }

    if let Some(book) = settle("order book", with_retries(max_attempts, move || client.order_book(symbol, Some(DepthLimit::L5))).await)? {
        info!("Order book {} last update id {}", symbol, book.last_update_id);
        for (i, bid) in book.bids.iter().enumerate() {
            info!("Bid #{i}: {} @ {}", bid.quantity, bid.price);
        }
        for (i, ask) in book.asks.iter().enumerate() {
            info!("Ask #{i}: {} @ {}", ask.quantity, ask.price);
        }
    }

    let budget = client.budget();
    info!("Weight used {}/{} in current window", budget.accumulated(), budget.capacity());

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = tracing_setup::init_with_stdout("bnc_snapshot", "logs", Level::INFO);

    dotenvy::dotenv().ok();

    let config_path = cli::get_config_path(DEFAULT_CONFIG_PATH);
    let config = config_loader::load_client_config_or_default(&config_path);
    let symbol = cli::get_symbol_uppercase(&config.symbol);

    let mut builder = BinanceClient::builder()
        .base_url(config.base_url.clone())
        .http_config(config.http_config())
        .gateway_config(config.gateway_config());

    match std::env::var("BINANCE_API_KEY") {
        Ok(api_key) => builder = builder.api_key(api_key),
        Err(_) => info!("BINANCE_API_KEY not set, sending requests without an API key"),
    }

    let client = builder.build()?;
    info!("Snapshotting {symbol} from {}", config.base_url);

    let shutdown = shutdown_handler::setup()?;

    loop {
        // retry sleeps inside a snapshot can run long, so the whole round races the signal
        tokio::select! {
            result = snapshot(&client, &symbol, config.max_attempts) => result?,
            _ = shutdown.requested() => break,
        }

        let Some(interval_ms) = config.poll_interval_ms else { break };
        if !shutdown.sleep(Duration::from_millis(interval_ms)).await {
            break;
        }
    }

    if shutdown.is_requested() {
        info!("Stopped on shutdown signal");
    }

    Ok(())
}
