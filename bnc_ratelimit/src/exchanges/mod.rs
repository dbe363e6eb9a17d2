//! Pre-configured weight budgets for exchanges
//!
//! Limits are set below the published caps to absorb the slack a fixed
//! window allows at its boundaries.

pub mod binance;
