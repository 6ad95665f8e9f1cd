use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    common::error::ServerError,
    game::{
        models::{
            AnswerResponse, CurrentQuestionResponse, Game, GameQuestion, GameResult, GameSummary,
            PendingQuestion, RecordedAnswer, StartGameResponse,
        },
        result::{build_result, summarize_all},
        shuffle::Randomizer,
        store::{GameStore, QuizCatalog},
    },
    quiz::models::{Question, QuestionView},
};

/// Single player play-through of a quiz. All state lives in the store between
/// calls; the engine itself holds nothing per game.
#[derive(Debug, Clone)]
pub struct GameEngine<S> {
    store: S,
    randomizer: Randomizer,
}

impl<S> GameEngine<S>
where
    S: QuizCatalog + GameStore,
{
    pub fn new(store: S, randomizer: Randomizer) -> Self {
        Self { store, randomizer }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn start_game(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<StartGameResponse, ServerError> {
        let snapshot = self
            .store
            .get_quiz_snapshot(quiz_id)
            .await?
            .ok_or_else(|| {
                ServerError::NotFound(format!("Quiz with id {} does not exist", quiz_id))
            })?;

        if snapshot.questions.is_empty() {
            warn!(
                "Refusing to start game on quiz {} without questions",
                snapshot.quiz_id
            );
            return Err(ServerError::BadRequest("This quiz has no questions".into()));
        }

        let mut questions = snapshot.questions;
        self.randomizer.shuffle(&mut questions);

        let game = Game::new(user_id, quiz_id);
        let question_ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let slots = GameQuestion::for_questions(&game, &question_ids);
        self.store.create_game(&game, &slots).await?;

        info!(
            "User {} started game {} on quiz {} with {} questions",
            user_id,
            game.id,
            quiz_id,
            slots.len()
        );

        let mut first = questions.swap_remove(0);
        self.randomizer.shuffle(&mut first.choices);

        Ok(StartGameResponse {
            game_id: game.id,
            question: first,
        })
    }

    /// The lowest unanswered slot, or `Finished` when every slot is answered.
    pub async fn pending_question(&self, game_id: Uuid) -> Result<PendingQuestion, ServerError> {
        if self.store.get_game(game_id).await?.is_none() {
            return Err(game_not_found(game_id));
        }

        let pending = match self.store.get_pending_question(game_id).await? {
            Some(gq) => PendingQuestion::Pending(gq),
            None => PendingQuestion::Finished,
        };

        Ok(pending)
    }

    pub async fn current_question(
        &self,
        user_id: Uuid,
        game_id: Uuid,
    ) -> Result<CurrentQuestionResponse, ServerError> {
        let game = self.owned_game(user_id, game_id).await?;

        let question = match self.pending_question(game.id).await? {
            PendingQuestion::Pending(_) if game.is_finished() => {
                error!("Finished game {} still has unanswered questions", game.id);
                return Err(ServerError::Internal(
                    "Finished game has unanswered questions".into(),
                ));
            }
            PendingQuestion::Pending(gq) => Some(self.render_question(gq.question_id).await?),
            PendingQuestion::Finished => None,
        };

        Ok(CurrentQuestionResponse {
            game_id: game.id,
            is_finished: question.is_none(),
            question,
        })
    }

    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        game_id: Uuid,
        choice_id: Uuid,
    ) -> Result<AnswerResponse, ServerError> {
        let game = self.owned_game(user_id, game_id).await?;

        if game.is_finished() {
            return Err(ServerError::Forbidden("This game is already finished".into()));
        }

        let Some(pending) = self.store.get_pending_question(game.id).await? else {
            error!("Game {} is not finished but has no pending question", game.id);
            return Err(ServerError::Internal(
                "Game has no pending question but is not finished".into(),
            ));
        };

        let question = self.load_question(pending.question_id).await?;
        let Some(choice) = question.find_choice(&choice_id) else {
            return Err(ServerError::BadRequest(
                "Choice does not belong to the current question".into(),
            ));
        };
        let is_correct = choice.is_correct;

        let answer = RecordedAnswer {
            game_id: game.id,
            game_question_id: pending.id,
            choice_id,
            is_correct,
            answered_at: Utc::now(),
        };
        let commit = self.store.record_answer(&answer).await?;

        debug!(
            "Game {} position {} answered, correct: {}, finished: {}",
            game.id, pending.position, is_correct, commit.game_finished
        );

        if commit.game_finished {
            info!("Game {} finished", game.id);
            return Ok(AnswerResponse {
                is_correct,
                is_finished: true,
                next_question: None,
            });
        }

        let Some(next) = self.store.get_pending_question(game.id).await? else {
            error!("Game {} has no next question after a non-final answer", game.id);
            return Err(ServerError::Internal(
                "Game has no next question but is not finished".into(),
            ));
        };

        let next_question = self.render_question(next.question_id).await?;

        Ok(AnswerResponse {
            is_correct,
            is_finished: false,
            next_question: Some(next_question),
        })
    }

    pub async fn game_result(&self, user_id: Uuid, game_id: Uuid) -> Result<GameResult, ServerError> {
        let game = self.owned_game(user_id, game_id).await?;
        let slots = self.store.get_game_questions(game.id).await?;
        let question_ids: Vec<Uuid> = slots.iter().map(|gq| gq.question_id).collect();
        let questions = self.store.get_questions(&question_ids).await?;

        Ok(build_result(&game, &slots, &questions))
    }

    pub async fn list_games(&self, user_id: Uuid) -> Result<Vec<GameSummary>, ServerError> {
        let games = self.store.list_user_games(user_id).await?;
        let slots = self.store.list_user_game_questions(user_id).await?;

        Ok(summarize_all(&games, slots))
    }

    async fn owned_game(&self, user_id: Uuid, game_id: Uuid) -> Result<Game, ServerError> {
        let game = self
            .store
            .get_game(game_id)
            .await?
            .ok_or_else(|| game_not_found(game_id))?;

        if game.user_id != user_id {
            warn!("User {} tried to access game {} owned by another user", user_id, game_id);
            return Err(ServerError::Forbidden(
                "You do not have permission to access this game".into(),
            ));
        }

        Ok(game)
    }

    async fn load_question(&self, question_id: Uuid) -> Result<Question, ServerError> {
        self.store
            .get_questions(&[question_id])
            .await?
            .into_iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| {
                error!("Question {} referenced by a game does not exist", question_id);
                ServerError::Internal("Question referenced by game is missing".into())
            })
    }

    /// Client facing question: no correctness, choices freshly shuffled.
    async fn render_question(&self, question_id: Uuid) -> Result<QuestionView, ServerError> {
        let mut view = QuestionView::from(self.load_question(question_id).await?);
        self.randomizer.shuffle(&mut view.choices);
        Ok(view)
    }
}

fn game_not_found(game_id: Uuid) -> ServerError {
    ServerError::NotFound(format!("Game with id {} does not exist", game_id))
}
