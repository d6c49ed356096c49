//! User service: registration, login and session tokens.

use quizgate::auth::{AuthService, PasswordHasher, TokenIssuer};
use quizgate::config::Config;
use quizgate::db::{self, PgUserStore};
use quizgate::repositories::{InMemoryUserStore, UserStore};
use quizgate::{create_user_service_app, telemetry, UserServiceState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    telemetry::init(&config.log_level)?;

    let store: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("using postgres user store");
            Arc::new(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory");
            Arc::new(InMemoryUserStore::new())
        }
    };

    let auth = AuthService::new(
        store,
        PasswordHasher::new()?,
        TokenIssuer::new(&config.jwt_secret),
        config.store_timeout,
    );
    let app = create_user_service_app(UserServiceState { auth });

    tracing::info!(addr = %config.user_service_addr, "user service listening");
    let listener = tokio::net::TcpListener::bind(config.user_service_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
