//! API gateway: rate limiting and prefix routing to the backend services.

use quizgate::config::Config;
use quizgate::{create_gateway_app, telemetry, GatewayState};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    telemetry::init(&config.log_level)?;

    let state = GatewayState::from_config(&config)?;
    let app = create_gateway_app(state);

    tracing::info!(
        addr = %config.gateway_addr,
        users = %config.user_service_url,
        quizzes = %config.quiz_service_url,
        max_requests = config.rate_limit_max,
        "gateway listening"
    );
    let listener = tokio::net::TcpListener::bind(config.gateway_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
