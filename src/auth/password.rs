//! Salted one-way password digests (Argon2id, PHC string format).

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory cost in KiB.
const M_COST: u32 = 19 * 1024;
/// Iterations.
const T_COST: u32 = 2;
/// Lanes.
const P_COST: u32 = 1;

/// Input for the digest that unknown-account logins are checked against.
const DUMMY_PASSWORD: &str = "quizgate-unknown-account";

/// Hashes and verifies passwords with a fixed work factor.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_digest: Arc<str>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    pub fn new() -> AppResult<Self> {
        let params = Params::new(M_COST, T_COST, P_COST, None)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("argon2 params: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_digest = argon2
            .hash_password(DUMMY_PASSWORD.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("dummy hash: {}", e)))?
            .to_string();
        Ok(Self {
            argon2,
            dummy_digest: dummy_digest.into(),
            #[cfg(test)]
            verifications: Arc::default(),
        })
    }

    /// A digest under the same parameters as [`hash`](Self::hash), matching no user's password.
    pub fn dummy_digest(&self) -> &str {
        &self.dummy_digest
    }

    /// Digest `password` under a fresh random salt.
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when `digest` is not a valid PHC string.
    pub fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);
        let parsed = PasswordHash::new(digest)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    #[cfg(test)]
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}
