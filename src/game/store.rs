use std::future::Future;

use uuid::Uuid;

use crate::{
    common::error::ServerError,
    game::models::{AnswerCommit, Game, GameQuestion, RecordedAnswer},
    quiz::models::{Question, QuizSnapshot},
};

/// Read-only access to quiz content owned by the catalog.
pub trait QuizCatalog: Send + Sync {
    fn get_quiz_snapshot(
        &self,
        quiz_id: Uuid,
    ) -> impl Future<Output = Result<Option<QuizSnapshot>, ServerError>> + Send;

    /// Questions with their choices, correctness included.
    fn get_questions(
        &self,
        question_ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<Question>, ServerError>> + Send;
}

/// Games and their positioned questions.
pub trait GameStore: Send + Sync {
    /// Persists the game and every slot atomically. Nothing survives a failure.
    fn create_game(
        &self,
        game: &Game,
        questions: &[GameQuestion],
    ) -> impl Future<Output = Result<(), ServerError>> + Send;

    fn get_game(
        &self,
        game_id: Uuid,
    ) -> impl Future<Output = Result<Option<Game>, ServerError>> + Send;

    /// Lowest position slot with no answer yet.
    fn get_pending_question(
        &self,
        game_id: Uuid,
    ) -> impl Future<Output = Result<Option<GameQuestion>, ServerError>> + Send;

    /// Marks the slot answered only if it still is unanswered, and finishes the
    /// game in the same transaction when no unanswered slot remains. A slot that
    /// was answered concurrently, or a game finished in the meantime, yields
    /// `ServerError::Conflict`.
    fn record_answer(
        &self,
        answer: &RecordedAnswer,
    ) -> impl Future<Output = Result<AnswerCommit, ServerError>> + Send;

    /// All slots of a game ordered by position.
    fn get_game_questions(
        &self,
        game_id: Uuid,
    ) -> impl Future<Output = Result<Vec<GameQuestion>, ServerError>> + Send;

    /// Newest first.
    fn list_user_games(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Game>, ServerError>> + Send;

    fn list_user_game_questions(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<GameQuestion>, ServerError>> + Send;
}
