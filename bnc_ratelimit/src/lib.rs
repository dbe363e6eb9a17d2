//! # bnc_ratelimit
//!
//! Fixed-window weight accounting for rate-limited REST APIs

pub mod budget;
pub mod error;
pub mod exchanges;
pub mod time;

pub use budget::BudgetSnapshot;
pub use budget::WeightBudget;
pub use budget::WeightBudgetBuilder;
pub use error::RateLimitError;
pub use error::Result;
pub use time::Clock;
pub use time::ManualClock;
pub use time::MonotonicClock;
