//! Authentication core: password hashing, session tokens, register/login.

mod handlers;
mod jwt;
mod password;
mod service;

pub use handlers::{login, me, register, AuthResponse, LoginRequest, RegisterRequest};
pub use jwt::{Claims, TokenError, TokenIssuer, TOKEN_TTL_SECS};
pub use password::PasswordHasher;
pub use service::{AuthOutcome, AuthService};
