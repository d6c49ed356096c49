//! Shared in-process services.

pub mod rate_limit;

pub use rate_limit::{RateDecision, RateLimiter};
