use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quiz::models::{Choice, Question, QuestionView};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    pub fn new(user_id: Uuid, quiz_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            quiz_id,
            finished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GameQuestion {
    pub id: Uuid,
    pub game_id: Uuid,
    pub question_id: Uuid,
    pub position: i32,
    pub choice_id: Option<Uuid>,
    pub is_correct: bool,
    pub answered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameQuestion {
    /// One unanswered slot per question, positioned in the given order.
    pub fn for_questions(game: &Game, question_ids: &[Uuid]) -> Vec<Self> {
        question_ids
            .iter()
            .enumerate()
            .map(|(position, question_id)| Self {
                id: Uuid::new_v4(),
                game_id: game.id,
                question_id: *question_id,
                position: position as i32,
                choice_id: None,
                is_correct: false,
                answered_at: None,
                created_at: game.created_at,
                updated_at: game.created_at,
            })
            .collect()
    }

    pub fn is_answered(&self) -> bool {
        self.answered_at.is_some()
    }
}

/// The single write SubmitAnswer performs against a pending slot.
#[derive(Debug, Clone)]
pub struct RecordedAnswer {
    pub game_id: Uuid,
    pub game_question_id: Uuid,
    pub choice_id: Uuid,
    pub is_correct: bool,
    pub answered_at: DateTime<Utc>,
}

/// Outcome of a committed answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerCommit {
    pub game_finished: bool,
}

#[derive(Debug, Clone)]
pub enum PendingQuestion {
    Pending(GameQuestion),
    Finished,
}

/* Responses */

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameResponse {
    pub game_id: Uuid,
    pub question: QuestionView,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub is_correct: bool,
    pub is_finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionView>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentQuestionResponse {
    pub game_id: Uuid,
    pub is_finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
}

/// Choice as shown in a result. The flag is only present once its question
/// has been answered in this game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultChoice {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub content: String,
    pub choices: Vec<ResultChoice>,
}

impl ResultQuestion {
    pub fn from_question(question: &Question, reveal: bool) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            content: question.content.clone(),
            choices: question
                .choices
                .iter()
                .map(|choice| ResultChoice::from_choice(choice, reveal))
                .collect(),
        }
    }
}

impl ResultChoice {
    pub fn from_choice(choice: &Choice, reveal: bool) -> Self {
        Self {
            id: choice.id,
            question_id: choice.question_id,
            content: choice.content.clone(),
            is_correct: reveal.then_some(choice.is_correct),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuestionDetail {
    pub id: Uuid,
    pub game_id: Uuid,
    pub question_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<ResultQuestion>,
    pub choice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<ResultChoice>,
    pub position: i32,
    pub answered_at: Option<DateTime<Utc>>,
    pub seconds_taken: i64,
    pub is_correct: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub is_finished: bool,
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub game_questions: Vec<GameQuestionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub total_questions: i64,
    pub correct_answers: i64,
    pub total_seconds_taken: i64,
    pub game: GameDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub is_finished: bool,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub total_seconds_taken: i64,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
