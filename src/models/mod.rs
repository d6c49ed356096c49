//! Data models for users and quizzes.

pub mod quiz;
pub mod user;

pub use quiz::*;
pub use user::*;
