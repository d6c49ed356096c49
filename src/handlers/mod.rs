//! HTTP request handlers and per-service state.

pub mod http;
pub mod quiz;

pub use http::*;
