//! Storage seams: user and quiz stores behind traits, with in-memory implementations.
//! The Postgres user store lives in [`crate::db`].

mod quiz_store;
mod user_store;

pub use quiz_store::{InMemoryQuizStore, QuizStore};
pub use user_store::{InMemoryUserStore, UserStore};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The unique index on `email` rejected the write.
    #[error("email already registered")]
    DuplicateEmail,

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),
}
