use std::collections::HashMap;

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::quiz::models::{Choice, ChoiceView, Question, QuestionRow, QuestionView, QuizSnapshot};

pub async fn quiz_exists(pool: &Pool<Postgres>, quiz_id: &Uuid) -> Result<bool, sqlx::Error> {
    let exists = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id FROM "quiz"
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?;

    Ok(exists.is_some())
}

/// Loads a quiz for game start. The correctness column is never selected here.
pub async fn get_quiz_snapshot(
    pool: &Pool<Postgres>,
    quiz_id: &Uuid,
) -> Result<Option<QuizSnapshot>, sqlx::Error> {
    if !quiz_exists(pool, quiz_id).await? {
        return Ok(None);
    }

    let rows = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT id, quiz_id, content
        FROM "question"
        WHERE quiz_id = $1 AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let question_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let choices = sqlx::query_as::<_, ChoiceView>(
        r#"
        SELECT id, question_id, content
        FROM "choice"
        WHERE question_id = ANY($1) AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(&question_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<ChoiceView>> = HashMap::new();
    for choice in choices {
        grouped.entry(choice.question_id).or_default().push(choice);
    }

    let questions = rows
        .into_iter()
        .map(|row| QuestionView {
            choices: grouped.remove(&row.id).unwrap_or_default(),
            id: row.id,
            quiz_id: row.quiz_id,
            content: row.content,
        })
        .collect();

    Ok(Some(QuizSnapshot {
        quiz_id: *quiz_id,
        questions,
    }))
}

/// Questions with correctness flags, for grading and result views only.
pub async fn get_questions_by_ids(
    pool: &Pool<Postgres>,
    question_ids: &[Uuid],
) -> Result<Vec<Question>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(vec![]);
    }

    let rows = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT id, quiz_id, content
        FROM "question"
        WHERE id = ANY($1)
        "#,
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await?;

    let choices = sqlx::query_as::<_, Choice>(
        r#"
        SELECT id, question_id, content, is_correct
        FROM "choice"
        WHERE question_id = ANY($1) AND deleted_at IS NULL
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(question_ids)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<Choice>> = HashMap::new();
    for choice in choices {
        grouped.entry(choice.question_id).or_default().push(choice);
    }

    let questions = rows
        .into_iter()
        .map(|row| {
            let choices = grouped.remove(&row.id).unwrap_or_default();
            Question::from_row(row, choices)
        })
        .collect();

    Ok(questions)
}
