//! Middleware and extractors: bearer-token auth, gateway rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::AuthUser;
pub use rate_limit::rate_limit;
