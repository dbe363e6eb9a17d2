use std::borrow::Cow;

use serde::Deserialize;
use serde::Deserializer;

/// One side of an order book level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

fn parse_decimal<E: serde::de::Error>(raw: &str) -> Result<f64, E> {
    raw.parse::<f64>().map_err(|err| E::custom(format!("invalid decimal {raw:?}: {err}")))
}

/// Deserialize a JSON decimal string such as `"42250.15"` to `f64`
pub fn deserialize_decimal_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Cow<'de, str> = Deserialize::deserialize(deserializer)?;
    parse_decimal(&s)
}

/// Deserialize `[["price", "qty"], ...]` into price levels
pub fn deserialize_price_levels<'de, D>(deserializer: D) -> Result<Vec<PriceLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let levels: Vec<(Cow<'de, str>, Cow<'de, str>)> = Deserialize::deserialize(deserializer)?;

    levels
        .into_iter()
        .map(|(price, quantity)| Ok(PriceLevel { price: parse_decimal(&price)?, quantity: parse_decimal(&quantity)? }))
        .collect()
}
