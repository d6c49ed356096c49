use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::StoreError;
use crate::models::user::{NewUser, User};

/// Durable mapping from email to user record.
///
/// Implementations must enforce email uniqueness themselves: callers perform a
/// lookup before `create`, but that pair is not atomic under concurrency.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persist a new user. Returns [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
}

/// Process-local user store keyed by email.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = new_user.into_user(Uuid::new_v4());
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}
