use chrono::Utc;
use sqlx::{Pool, Postgres, Transaction};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    common::error::ServerError,
    game::{
        models::{AnswerCommit, Game, GameQuestion, RecordedAnswer},
        store::{GameStore, QuizCatalog},
    },
    quiz::{
        db::{get_questions_by_ids, get_quiz_snapshot},
        models::{Question, QuizSnapshot},
    },
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: &Pool<Postgres>) -> Self {
        Self { pool: pool.clone() }
    }
}

impl QuizCatalog for PgStore {
    async fn get_quiz_snapshot(&self, quiz_id: Uuid) -> Result<Option<QuizSnapshot>, ServerError> {
        let snapshot = get_quiz_snapshot(&self.pool, &quiz_id).await?;
        Ok(snapshot)
    }

    async fn get_questions(&self, question_ids: &[Uuid]) -> Result<Vec<Question>, ServerError> {
        let questions = get_questions_by_ids(&self.pool, question_ids).await?;
        Ok(questions)
    }
}

impl GameStore for PgStore {
    async fn create_game(&self, game: &Game, questions: &[GameQuestion]) -> Result<(), ServerError> {
        let mut tx = self.pool.begin().await?;
        tx_insert_game(&mut tx, game).await?;
        tx_insert_game_questions(&mut tx, game, questions).await?;
        tx.commit().await?;

        debug!(
            "Created game {} with {} questions",
            game.id,
            questions.len()
        );
        Ok(())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, ServerError> {
        let game = sqlx::query_as::<_, Game>(
            r#"
            SELECT id, user_id, quiz_id, finished_at, created_at, updated_at
            FROM "game"
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(game)
    }

    async fn get_pending_question(&self, game_id: Uuid) -> Result<Option<GameQuestion>, ServerError> {
        let pending = sqlx::query_as::<_, GameQuestion>(
            r#"
            SELECT id, game_id, question_id, position, choice_id, is_correct,
                answered_at, created_at, updated_at
            FROM "game_question"
            WHERE game_id = $1 AND answered_at IS NULL
            ORDER BY position ASC
            LIMIT 1
            "#,
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pending)
    }

    async fn record_answer(&self, answer: &RecordedAnswer) -> Result<AnswerCommit, ServerError> {
        let mut tx = self.pool.begin().await?;

        // Serializes answers within one game
        let finished_at = sqlx::query_scalar::<_, Option<chrono::DateTime<Utc>>>(
            r#"
            SELECT finished_at FROM "game"
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(answer.game_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            ServerError::NotFound(format!("Game with id {} does not exist", answer.game_id))
        })?;

        // The caller saw the game running, so another answer got here first
        if finished_at.is_some() {
            warn!(
                "Game {} finished before answer to {} was recorded",
                answer.game_id, answer.game_question_id
            );
            return Err(ServerError::Conflict(
                "This question has already been answered".into(),
            ));
        }

        let row = sqlx::query(
            r#"
            UPDATE "game_question"
            SET choice_id = $1, is_correct = $2, answered_at = $3, updated_at = $3
            WHERE id = $4 AND game_id = $5 AND answered_at IS NULL
            "#,
        )
        .bind(answer.choice_id)
        .bind(answer.is_correct)
        .bind(answer.answered_at)
        .bind(answer.game_question_id)
        .bind(answer.game_id)
        .execute(&mut *tx)
        .await?;

        if row.rows_affected() == 0 {
            warn!(
                "Game question {} was already answered, rejecting submission",
                answer.game_question_id
            );
            return Err(ServerError::Conflict(
                "This question has already been answered".into(),
            ));
        }

        let remaining = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM "game_question"
            WHERE game_id = $1 AND answered_at IS NULL
            "#,
        )
        .bind(answer.game_id)
        .fetch_one(&mut *tx)
        .await?;

        let game_finished = remaining == 0;
        if game_finished {
            let row = sqlx::query(
                r#"
                UPDATE "game"
                SET finished_at = $1, updated_at = $1
                WHERE id = $2 AND finished_at IS NULL
                "#,
            )
            .bind(answer.answered_at)
            .bind(answer.game_id)
            .execute(&mut *tx)
            .await?;

            if row.rows_affected() == 0 {
                error!("Failed to finish game {}", answer.game_id);
                return Err(ServerError::Internal("Failed to finish game".into()));
            }
        }

        tx.commit().await?;
        Ok(AnswerCommit { game_finished })
    }

    async fn get_game_questions(&self, game_id: Uuid) -> Result<Vec<GameQuestion>, ServerError> {
        let questions = sqlx::query_as::<_, GameQuestion>(
            r#"
            SELECT id, game_id, question_id, position, choice_id, is_correct,
                answered_at, created_at, updated_at
            FROM "game_question"
            WHERE game_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn list_user_games(&self, user_id: Uuid) -> Result<Vec<Game>, ServerError> {
        let games = sqlx::query_as::<_, Game>(
            r#"
            SELECT id, user_id, quiz_id, finished_at, created_at, updated_at
            FROM "game"
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(games)
    }

    async fn list_user_game_questions(&self, user_id: Uuid) -> Result<Vec<GameQuestion>, ServerError> {
        let questions = sqlx::query_as::<_, GameQuestion>(
            r#"
            SELECT gq.id, gq.game_id, gq.question_id, gq.position, gq.choice_id,
                gq.is_correct, gq.answered_at, gq.created_at, gq.updated_at
            FROM "game_question" gq
            JOIN "game" g ON g.id = gq.game_id
            WHERE g.user_id = $1 AND g.deleted_at IS NULL
            ORDER BY gq.game_id, gq.position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }
}

async fn tx_insert_game(tx: &mut Transaction<'_, Postgres>, game: &Game) -> Result<(), ServerError> {
    let row = sqlx::query(
        r#"
        INSERT INTO "game" (id, user_id, quiz_id, finished_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(game.id)
    .bind(game.user_id)
    .bind(game.quiz_id)
    .bind(game.finished_at)
    .bind(game.created_at)
    .bind(game.updated_at)
    .execute(&mut **tx)
    .await?;

    if row.rows_affected() == 0 {
        error!("Failed to persist game {}", game.id);
        return Err(ServerError::Internal("Failed to persist game".into()));
    }

    Ok(())
}

async fn tx_insert_game_questions(
    tx: &mut Transaction<'_, Postgres>,
    game: &Game,
    questions: &[GameQuestion],
) -> Result<(), ServerError> {
    let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
    let question_ids: Vec<Uuid> = questions.iter().map(|q| q.question_id).collect();
    let positions: Vec<i32> = questions.iter().map(|q| q.position).collect();

    let row = sqlx::query(
        r#"
        INSERT INTO "game_question" (id, game_id, question_id, position, is_correct, created_at, updated_at)
        SELECT t.id, $1, t.question_id, t.position, false, $2, $2
        FROM UNNEST($3::UUID[], $4::UUID[], $5::INT4[]) AS t(id, question_id, position)
        "#,
    )
    .bind(game.id)
    .bind(game.created_at)
    .bind(&ids)
    .bind(&question_ids)
    .bind(&positions)
    .execute(&mut **tx)
    .await?;

    if row.rows_affected() != questions.len() as u64 {
        error!(
            "Persisted {} of {} game questions for game {}",
            row.rows_affected(),
            questions.len(),
            game.id
        );
        return Err(ServerError::Internal(
            "Failed to persist game questions".into(),
        ));
    }

    Ok(())
}
