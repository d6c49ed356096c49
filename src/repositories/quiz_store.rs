use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::quiz::{AnswerOption, Question, Quiz};

#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn list_quizzes(&self) -> Vec<Quiz>;

    /// Questions belonging to `quiz_id`; empty when the quiz is unknown.
    async fn questions_for(&self, quiz_id: &str) -> Vec<Question>;

    /// Store a quiz under a freshly generated id.
    async fn create_quiz(&self, title: String, description: String) -> Quiz;
}

#[derive(Default)]
struct QuizData {
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
}

/// In-memory quiz catalogue.
#[derive(Default)]
pub struct InMemoryQuizStore {
    data: RwLock<QuizData>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a sample programming quiz.
    pub fn seeded() -> Self {
        let data = QuizData {
            quizzes: vec![Quiz {
                id: "1".to_string(),
                title: "Programming quiz".to_string(),
                description: "Test your programming knowledge".to_string(),
            }],
            questions: vec![Question {
                id: "101".to_string(),
                quiz_id: "1".to_string(),
                question_text: "What is Node.js?".to_string(),
                options: vec![
                    AnswerOption { text: "A programming language".to_string(), is_correct: false },
                    AnswerOption { text: "A JavaScript runtime".to_string(), is_correct: true },
                    AnswerOption { text: "A database".to_string(), is_correct: false },
                ],
            }],
        };
        Self { data: RwLock::new(data) }
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn list_quizzes(&self) -> Vec<Quiz> {
        self.data.read().await.quizzes.clone()
    }

    async fn questions_for(&self, quiz_id: &str) -> Vec<Question> {
        self.data
            .read()
            .await
            .questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect()
    }

    async fn create_quiz(&self, title: String, description: String) -> Quiz {
        let quiz = Quiz {
            id: Uuid::new_v4().simple().to_string(),
            title,
            description,
        };
        self.data.write().await.quizzes.push(quiz.clone());
        quiz
    }
}
