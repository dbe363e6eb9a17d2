use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::time::Clock;
use crate::time::MonotonicClock;
use crate::time::duration_to_nanos;

/// Fixed-window weight accountant shared by every caller of one API key
///
/// Weight accumulates from the start of the current window. The first
/// reservation made once the window has run its full length opens a new
/// window at that instant, seeded with the reservation's own weight.
///
/// A reservation that does not fit is not recorded. Instead the caller gets
/// the time remaining until the window rolls over. The budget never sleeps.
#[derive(Debug)]
pub struct WeightBudget {
    /// Counters guarded by a single lock; never held across I/O
    state: Mutex<WindowState>,

    /// Maximum weight admitted per window
    limit: u32,

    /// Window duration in nanoseconds
    window_nanos: u64,

    clock: Arc<dyn Clock>,
}

#[derive(Debug)]
struct WindowState {
    accumulated: u32,
    window_start: u64,
}

/// Point-in-time view of a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSnapshot {
    /// Weight consumed in the current window (zero once the window has lapsed)
    pub accumulated: u32,
    /// Clock reading at which the current window began
    pub window_start: Duration,
    /// Time since the current window began
    pub elapsed: Duration,
}

impl WeightBudget {
    /// Create a budget admitting `limit` weight per `window`
    pub fn new(limit: u32, window: Duration) -> Result<Self> {
        Self::with_clock(limit, window, Arc::new(MonotonicClock::new()))
    }

    /// Create a budget with a per-minute limit
    pub fn per_minute(limit: u32) -> Result<Self> {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Create a budget reading time from `clock`
    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        if limit == 0 {
            return Err(RateLimitError::InvalidConfig("limit must be greater than 0"));
        }
        if window.is_zero() {
            return Err(RateLimitError::InvalidConfig("window duration must be greater than 0"));
        }

        Ok(Self::from_valid_parts(limit, window, clock))
    }

    /// Build without validation; `limit` and `window` must both be non-zero
    pub(crate) fn from_valid_parts(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now_nanos();

        Self {
            state: Mutex::new(WindowState { accumulated: 0, window_start }),
            limit,
            window_nanos: duration_to_nanos(window),
            clock,
        }
    }

    /// Create a builder for configuring a budget
    pub fn builder() -> WeightBudgetBuilder {
        WeightBudgetBuilder::new()
    }

    /// Record `weight` against the current window
    ///
    /// Returns `Duration::ZERO` when the weight was admitted, otherwise the
    /// time left until the window rolls over. A rejected reservation leaves
    /// the budget untouched, so callers must not spin on this method.
    pub fn reserve(&self, weight: u32) -> Duration {
        if weight == 0 {
            return Duration::ZERO;
        }

        let mut state = self.state.lock();
        let now = self.clock.now_nanos();
        let elapsed = now.saturating_sub(state.window_start);

        if elapsed >= self.window_nanos {
            state.window_start = now;
            state.accumulated = weight;
            drop(state);

            debug!(weight, limit = self.limit, "weight window rolled over");
            return Duration::ZERO;
        }

        let accumulated = state.accumulated.saturating_add(weight);
        if accumulated <= self.limit {
            state.accumulated = accumulated;
            drop(state);

            debug!(weight, accumulated, limit = self.limit, "weight reserved");
            return Duration::ZERO;
        }

        Duration::from_nanos(self.window_nanos - elapsed)
    }

    /// Weight consumed in the current window
    pub fn accumulated(&self) -> u32 {
        self.snapshot().accumulated
    }

    /// Weight still available in the current window
    pub fn available(&self) -> u32 {
        self.limit.saturating_sub(self.accumulated())
    }

    /// Maximum weight per window
    pub fn capacity(&self) -> u32 {
        self.limit
    }

    /// Window length
    pub fn window(&self) -> Duration {
        Duration::from_nanos(self.window_nanos)
    }

    /// Read the counters without reserving anything
    pub fn snapshot(&self) -> BudgetSnapshot {
        let state = self.state.lock();
        let elapsed = self.clock.now_nanos().saturating_sub(state.window_start);
        let accumulated = if elapsed >= self.window_nanos { 0 } else { state.accumulated };

        BudgetSnapshot { accumulated, window_start: Duration::from_nanos(state.window_start), elapsed: Duration::from_nanos(elapsed) }
    }

    /// Discard all accumulated weight and start a fresh window now
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.accumulated = 0;
        state.window_start = self.clock.now_nanos();
    }
}

/// Builder for configuring a weight budget
#[derive(Debug, Default)]
pub struct WeightBudgetBuilder {
    limit: Option<u32>,
    window: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl WeightBudgetBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limit (max weight per window)
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the window duration
    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Set window to 1 minute
    pub fn per_minute(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self.window = Some(Duration::from_secs(60));
        self
    }

    /// Read time from `clock` instead of the monotonic system clock
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the budget
    pub fn build(self) -> Result<WeightBudget> {
        let limit = self.limit.ok_or(RateLimitError::InvalidConfig("limit must be set"))?;
        let window = self.window.ok_or(RateLimitError::InvalidConfig("window must be set"))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        WeightBudget::with_clock(limit, window, clock)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::WeightBudget;
    use crate::error::RateLimitError;
    use crate::time::ManualClock;

    fn manual_budget(limit: u32) -> (WeightBudget, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let budget = WeightBudget::builder().per_minute(limit).clock(clock.clone()).build().unwrap();
        (budget, clock)
    }

    #[test]
    fn test_creation() {
        let budget = WeightBudget::per_minute(1100).unwrap();
        assert_eq!(budget.capacity(), 1100);
        assert_eq!(budget.available(), 1100);
        assert_eq!(budget.accumulated(), 0);
        assert_eq!(budget.window(), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_config() {
        assert_eq!(WeightBudget::per_minute(0).unwrap_err(), RateLimitError::InvalidConfig("limit must be greater than 0"));
        assert!(WeightBudget::new(10, Duration::ZERO).is_err());
        assert!(WeightBudget::builder().limit(10).build().is_err());
        assert!(WeightBudget::builder().window(Duration::from_secs(1)).build().is_err());
    }

    #[test]
    fn test_reserve_within_limit() {
        let (budget, clock) = manual_budget(10);

        assert_eq!(budget.reserve(1), Duration::ZERO);
        clock.advance(Duration::from_secs(5));
        assert_eq!(budget.reserve(5), Duration::ZERO);
        assert_eq!(budget.accumulated(), 6);
        assert_eq!(budget.available(), 4);

        // exactly at the limit is still admitted
        assert_eq!(budget.reserve(4), Duration::ZERO);
        assert_eq!(budget.accumulated(), 10);
    }

    #[test]
    fn test_rejection_leaves_counter_untouched() {
        let (budget, clock) = manual_budget(10);

        assert_eq!(budget.reserve(8), Duration::ZERO);
        clock.advance(Duration::from_secs(15));

        let hint = budget.reserve(3);
        assert_eq!(hint, Duration::from_secs(45));
        assert_eq!(budget.accumulated(), 8);

        // a smaller weight that still fits goes through afterwards
        assert_eq!(budget.reserve(2), Duration::ZERO);
        assert_eq!(budget.accumulated(), 10);
    }

    #[test]
    fn test_hint_shrinks_as_window_ages() {
        let (budget, clock) = manual_budget(1);

        assert_eq!(budget.reserve(1), Duration::ZERO);
        clock.advance(Duration::from_millis(59_999));
        assert_eq!(budget.reserve(1), Duration::from_millis(1));
    }

    #[test]
    fn test_window_rollover() {
        let (budget, clock) = manual_budget(10);

        assert_eq!(budget.reserve(10), Duration::ZERO);
        assert!(budget.reserve(1) > Duration::ZERO);

        clock.advance(Duration::from_secs(60));
        assert_eq!(budget.reserve(3), Duration::ZERO);

        let snapshot = budget.snapshot();
        assert_eq!(snapshot.accumulated, 3);
        assert_eq!(snapshot.window_start, Duration::from_secs(60));
        assert_eq!(snapshot.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_rollover_starts_at_reservation_time() {
        let (budget, clock) = manual_budget(10);

        assert_eq!(budget.reserve(4), Duration::ZERO);
        clock.advance(Duration::from_secs(150));
        assert_eq!(budget.reserve(2), Duration::ZERO);
        assert_eq!(budget.snapshot().window_start, Duration::from_secs(150));

        // new window lasts a full length from the rollover, not from an aligned boundary
        clock.advance(Duration::from_secs(59));
        assert_eq!(budget.reserve(9), Duration::from_secs(1));
    }

    #[test]
    fn test_lapsed_window_reads_as_empty() {
        let (budget, clock) = manual_budget(10);

        budget.reserve(7);
        clock.advance(Duration::from_secs(61));
        assert_eq!(budget.accumulated(), 0);
        assert_eq!(budget.available(), 10);
    }

    #[test]
    fn test_zero_weight() {
        let (budget, _clock) = manual_budget(10);
        assert_eq!(budget.reserve(0), Duration::ZERO);
        assert_eq!(budget.accumulated(), 0);
    }

    #[test]
    fn test_reset() {
        let (budget, clock) = manual_budget(10);

        budget.reserve(10);
        clock.advance(Duration::from_secs(30));
        budget.reset();

        assert_eq!(budget.accumulated(), 0);
        assert_eq!(budget.snapshot().window_start, Duration::from_secs(30));
    }

    #[test]
    fn test_concurrent_reservations_lose_no_weight() {
        let budget = Arc::new(WeightBudget::per_minute(1000).unwrap());
        let mut handles = vec![];

        // 10 threads x 100 reservations of weight 1 = exactly the limit
        for _ in 0..10 {
            let budget = Arc::clone(&budget);
            handles.push(std::thread::spawn(move || (0..100).filter(|_| budget.reserve(1).is_zero()).count()));
        }

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

        assert_eq!(admitted, 1000);
        assert_eq!(budget.accumulated(), 1000);
    }

    #[test]
    fn test_concurrent_contenders_admit_exactly_one() {
        for _ in 0..50 {
            let budget = Arc::new(WeightBudget::per_minute(100).unwrap());
            budget.reserve(90);

            // 6 + 5 exceeds the remaining 10 by one
            let handles: Vec<_> = [6, 5]
                .into_iter()
                .map(|weight| {
                    let budget = Arc::clone(&budget);
                    std::thread::spawn(move || budget.reserve(weight).is_zero())
                })
                .collect();

            let admitted = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
            assert_eq!(admitted, 1);
            assert!(budget.accumulated() == 96 || budget.accumulated() == 95);
        }
    }

    proptest! {
        #[test]
        fn prop_weights_within_limit_are_all_admitted(weights in prop::collection::vec(1u32..50, 0..40)) {
            let total: u32 = weights.iter().sum();
            let (budget, _clock) = manual_budget(total.max(1));

            for weight in &weights {
                prop_assert_eq!(budget.reserve(*weight), Duration::ZERO);
            }
            prop_assert_eq!(budget.accumulated(), total);
        }

        #[test]
        fn prop_accumulated_never_exceeds_limit(limit in 1u32..500, weights in prop::collection::vec(1u32..100, 1..60)) {
            let (budget, _clock) = manual_budget(limit);

            for weight in weights {
                let before = budget.accumulated();
                let hint = budget.reserve(weight);
                if hint.is_zero() {
                    prop_assert_eq!(budget.accumulated(), before + weight);
                } else {
                    prop_assert_eq!(budget.accumulated(), before);
                    prop_assert_eq!(hint, Duration::from_secs(60));
                }
                prop_assert!(budget.accumulated() <= limit);
            }
        }
    }
}
