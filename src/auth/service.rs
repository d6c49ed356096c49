//! Registration and login over a [`UserStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::error::{AppError, AppResult};
use crate::models::user::{NewUser, Role, User, UserSummary};
use crate::repositories::{StoreError, UserStore};

/// Result of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub token: String,
    pub user: UserSummary,
    /// `true` only when registration created a new record.
    pub created: bool,
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            store_timeout,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Create an account, or log the existing account in when `email` is already registered.
    #[instrument(skip(self, username, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<AuthOutcome> {
        if let Some(existing) = self.find_by_email(email).await? {
            info!(user_id = %existing.id, "email already registered, logging in");
            return self.outcome(&existing, false);
        }

        let password_hash = self.hash(password).await?;
        let new_user = NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role: Role::User,
        };

        match self.with_timeout(self.store.create(new_user)).await {
            Ok(user) => {
                info!(user_id = %user.id, "user registered");
                self.outcome(&user, true)
            }
            Err(AppError::Store(StoreError::DuplicateEmail)) => {
                // Lost a concurrent registration race; the winner's record stands.
                let existing = self
                    .find_by_email(email)
                    .await?
                    .ok_or_else(|| AppError::Internal(anyhow::anyhow!("duplicate email vanished")))?;
                warn!(user_id = %existing.id, "concurrent registration, logging in existing user");
                self.outcome(&existing, false)
            }
            Err(e) => Err(e),
        }
    }

    /// Unknown email and wrong password both fail with [`AppError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let Some(user) = self.find_by_email(email).await? else {
            // Unknown emails pay for one verification too.
            let _ = self.verify(password, self.hasher.dummy_digest()).await;
            return Err(AppError::InvalidCredentials);
        };

        if !self.verify(password, &user.password_hash).await? {
            info!(user_id = %user.id, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.outcome(&user, false)
    }

    fn outcome(&self, user: &User, created: bool) -> AppResult<AuthOutcome> {
        Ok(AuthOutcome {
            token: self.tokens.issue(user)?,
            user: user.summary(),
            created,
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.with_timeout(self.store.find_by_email(email)).await
    }

    async fn with_timeout<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::Timeout),
        }
    }

    async fn hash(&self, password: &str) -> AppResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task: {}", e)))?
    }

    async fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let digest = digest.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserStore;
    use async_trait::async_trait;

    fn service_with(store: Arc<dyn UserStore>) -> AuthService {
        AuthService::new(
            store,
            PasswordHasher::new().unwrap(),
            TokenIssuer::new("test-secret"),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn register_creates_user_and_token() {
        let store = Arc::new(InMemoryUserStore::new());
        let svc = service_with(store.clone());
        let out = svc.register("dave", "dave@example.com", "hunter22").await.unwrap();
        assert!(out.created);
        assert_eq!(out.user.email, "dave@example.com");
        assert_eq!(out.user.role, Role::User);
        let claims = svc.tokens().verify(&out.token).unwrap();
        assert_eq!(claims.user_id, out.user.id);

        let stored = store.find_by_email("dave@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "hunter22");
    }

    #[tokio::test]
    async fn duplicate_register_logs_in_existing_user() {
        let store = Arc::new(InMemoryUserStore::new());
        let svc = service_with(store.clone());
        let first = svc.register("erin", "erin@example.com", "pw-one").await.unwrap();
        let second = svc.register("erin2", "erin@example.com", "pw-two").await.unwrap();
        assert!(!second.created);
        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.username, "erin");
        assert!(svc.tokens().verify(&second.token).is_ok());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_leave_one_record() {
        let store = Arc::new(InMemoryUserStore::new());
        let svc = service_with(store.clone());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    svc.register(&format!("racer{}", i), "race@example.com", "pw").await
                })
            })
            .collect();
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap().user.id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let svc = service_with(Arc::new(InMemoryUserStore::new()));
        let reg = svc.register("frank", "frank@example.com", "s3cret").await.unwrap();
        let out = svc.login("frank@example.com", "s3cret").await.unwrap();
        assert_eq!(out.user.id, reg.user.id);
        assert!(!out.created);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = service_with(Arc::new(InMemoryUserStore::new()));
        svc.register("gina", "gina@example.com", "right").await.unwrap();
        let wrong_pw = svc.login("gina@example.com", "wrong").await.unwrap_err();
        let no_user = svc.login("nobody@example.com", "right").await.unwrap_err();
        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(no_user, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_verification() {
        let svc = service_with(Arc::new(InMemoryUserStore::new()));
        svc.register("hal", "hal@example.com", "right").await.unwrap();

        let before = svc.hasher.verifications();
        svc.login("hal@example.com", "wrong").await.unwrap_err();
        let wrong_password = svc.hasher.verifications() - before;

        let before = svc.hasher.verifications();
        svc.login("nobody@example.com", "wrong").await.unwrap_err();
        let unknown_email = svc.hasher.verifications() - before;

        assert_eq!(wrong_password, 1);
        assert_eq!(unknown_email, 1);
    }

    struct FailingStore;

    #[async_trait]
    impl UserStore for FailingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Corrupt("disk on fire".into()))
        }
        async fn create(&self, _new_user: NewUser) -> Result<User, StoreError> {
            Err(StoreError::Corrupt("disk on fire".into()))
        }
    }

    struct HangingStore;

    #[async_trait]
    impl UserStore for HangingStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            std::future::pending().await
        }
        async fn create(&self, _new_user: NewUser) -> Result<User, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn store_failure_is_internal() {
        let svc = service_with(Arc::new(FailingStore));
        let err = svc.register("h", "h@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
        let err = svc.login("h@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let svc = AuthService::new(
            Arc::new(HangingStore),
            PasswordHasher::new().unwrap(),
            TokenIssuer::new("test-secret"),
            Duration::from_millis(20),
        );
        let err = svc.login("i@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}
