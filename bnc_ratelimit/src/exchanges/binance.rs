//! Binance weight budget presets
//!
//! Binance enforces a REQUEST_WEIGHT limit of 1_200 per minute per IP on the
//! spot REST API. Every endpoint has a published weight; exceeding the limit
//! yields HTTP 429 and, if ignored, an IP ban (HTTP 418).
//!
//! Reference: https://binance-docs.github.io/apidocs/spot/en/#limits

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::MonotonicClock;
use crate::WeightBudget;

/// Published spot REST weight limit per minute
pub const SPOT_WEIGHT_PER_MINUTE: u32 = 1_200;

/// Default budget limit, kept under the published cap
pub const SPOT_WEIGHT_LIMIT: u32 = 1_100;

/// Length of the Binance weight window
pub const SPOT_WEIGHT_WINDOW: Duration = Duration::from_secs(60);

/// Limit of the conservative preset, 66% of the published cap
pub const SPOT_WEIGHT_LIMIT_CONSERVATIVE: u32 = 800;

const _: () = assert!(SPOT_WEIGHT_LIMIT > 0 && SPOT_WEIGHT_LIMIT_CONSERVATIVE > 0 && !SPOT_WEIGHT_WINDOW.is_zero());

/// Binance spot weight budget (1_100 per minute)
pub fn spot_weight_budget() -> WeightBudget {
    WeightBudget::from_valid_parts(SPOT_WEIGHT_LIMIT, SPOT_WEIGHT_WINDOW, Arc::new(MonotonicClock::new()))
}

/// Conservative Binance budget (800 per minute)
pub fn spot_weight_budget_conservative() -> WeightBudget {
    WeightBudget::from_valid_parts(SPOT_WEIGHT_LIMIT_CONSERVATIVE, SPOT_WEIGHT_WINDOW, Arc::new(MonotonicClock::new()))
}

/// Custom per-minute weight budget
pub fn custom_weight_budget(weight_per_minute: u32) -> Result<WeightBudget> {
    WeightBudget::builder().limit(weight_per_minute).window(SPOT_WEIGHT_WINDOW).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_weight_budget() {
        let budget = spot_weight_budget();

        assert_eq!(budget.capacity(), 1_100);
        assert!(budget.capacity() < SPOT_WEIGHT_PER_MINUTE);
        assert_eq!(budget.window(), Duration::from_secs(60));
        assert!(budget.reserve(50).is_zero());
        assert_eq!(budget.available(), 1_050);
    }

    #[test]
    fn test_spot_weight_budget_conservative() {
        let budget = spot_weight_budget_conservative();

        let capacity = budget.capacity();
        assert!(capacity <= 800, "Expected <= 800, got {}", capacity);
        assert_eq!(budget.window(), SPOT_WEIGHT_WINDOW);
    }

    #[test]
    fn test_presets_match_validated_construction() {
        let validated = WeightBudget::new(SPOT_WEIGHT_LIMIT, SPOT_WEIGHT_WINDOW).unwrap();
        let preset = spot_weight_budget();

        assert_eq!(preset.capacity(), validated.capacity());
        assert_eq!(preset.window(), validated.window());
        assert_eq!(preset.reserve(SPOT_WEIGHT_LIMIT), validated.reserve(SPOT_WEIGHT_LIMIT));
        assert_eq!(preset.reserve(1).is_zero(), validated.reserve(1).is_zero());
        assert!(custom_weight_budget(SPOT_WEIGHT_LIMIT_CONSERVATIVE).is_ok());
    }

    #[test]
    fn test_custom_weight_budget() {
        let budget = custom_weight_budget(2_400).unwrap();

        assert_eq!(budget.capacity(), 2_400);
        assert!(budget.reserve(100).is_zero());
        assert_eq!(budget.available(), 2_300);

        assert!(custom_weight_budget(0).is_err());
    }
}
