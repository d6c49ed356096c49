//! Quiz catalogue handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::http::QuizServiceState;
use crate::error::AppError;
use crate::models::quiz::{Question, Quiz};

#[derive(Debug, Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// GET /api/quizzes
pub async fn list_quizzes(State(state): State<QuizServiceState>) -> Json<Vec<Quiz>> {
    Json(state.quizzes.list_quizzes().await)
}

/// GET /api/quizzes/:quiz_id/questions
pub async fn list_questions(
    State(state): State<QuizServiceState>,
    Path(quiz_id): Path<String>,
) -> Json<Vec<Question>> {
    Json(state.quizzes.questions_for(&quiz_id).await)
}

/// POST /api/quizzes
pub async fn create_quiz(
    State(state): State<QuizServiceState>,
    Json(body): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    let title = body.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title required".to_string()));
    }
    let quiz = state
        .quizzes
        .create_quiz(title.to_string(), body.description)
        .await;
    tracing::info!(quiz_id = %quiz.id, "quiz created");
    Ok((StatusCode::CREATED, Json(quiz)))
}
