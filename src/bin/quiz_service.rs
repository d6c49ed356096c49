//! Quiz service: in-memory quiz catalogue.

use quizgate::config::Config;
use quizgate::repositories::InMemoryQuizStore;
use quizgate::{create_quiz_service_app, telemetry, QuizServiceState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    telemetry::init(&config.log_level)?;

    let app = create_quiz_service_app(QuizServiceState {
        quizzes: Arc::new(InMemoryQuizStore::seeded()),
    });

    tracing::info!(addr = %config.quiz_service_addr, "quiz service listening");
    let listener = tokio::net::TcpListener::bind(config.quiz_service_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
