use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::ServerError,
    game::{
        models::{AnswerCommit, Game, GameQuestion, RecordedAnswer},
        store::{GameStore, QuizCatalog},
    },
    quiz::models::{Choice, Question, QuizSnapshot},
};

/// In-memory stand-in for Postgres with the same write rules: atomic game
/// creation and answers that only land on a still unanswered slot.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_next_create: AtomicBool,
}

#[derive(Default)]
struct Inner {
    quizzes: HashMap<Uuid, Vec<Question>>,
    games: HashMap<Uuid, Game>,
    slots: Vec<GameQuestion>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    pub fn add_quiz(&self, questions: Vec<Question>) -> Uuid {
        let quiz_id = questions
            .first()
            .map(|q| q.quiz_id)
            .unwrap_or_else(Uuid::new_v4);
        self.lock().quizzes.insert(quiz_id, questions);
        quiz_id
    }

    pub fn add_empty_quiz(&self) -> Uuid {
        let quiz_id = Uuid::new_v4();
        self.lock().quizzes.insert(quiz_id, vec![]);
        quiz_id
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn game_count(&self) -> usize {
        self.lock().games.len()
    }

    pub fn slot_count(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn slots(&self, game_id: Uuid) -> Vec<GameQuestion> {
        let mut slots: Vec<GameQuestion> = self
            .lock()
            .slots
            .iter()
            .filter(|gq| gq.game_id == game_id)
            .cloned()
            .collect();
        slots.sort_by_key(|gq| gq.position);
        slots
    }

    pub fn answered_count(&self, game_id: Uuid) -> usize {
        self.slots(game_id)
            .iter()
            .filter(|gq| gq.is_answered())
            .count()
    }

    pub fn game(&self, game_id: Uuid) -> Option<Game> {
        self.lock().games.get(&game_id).cloned()
    }

    pub fn set_game_created_at(&self, game_id: Uuid, created_at: DateTime<Utc>) {
        if let Some(game) = self.lock().games.get_mut(&game_id) {
            game.created_at = created_at;
        }
    }
}

pub fn question(quiz_id: Uuid, content: &str, choices: &[(&str, bool)]) -> Question {
    let id = Uuid::new_v4();
    Question {
        id,
        quiz_id,
        content: content.to_string(),
        choices: choices
            .iter()
            .map(|(content, is_correct)| Choice {
                id: Uuid::new_v4(),
                question_id: id,
                content: content.to_string(),
                is_correct: *is_correct,
            })
            .collect(),
    }
}

/// `count` questions on one quiz, each with one correct and two wrong choices.
pub fn numbered_quiz(count: usize) -> Vec<Question> {
    let quiz_id = Uuid::new_v4();
    (0..count)
        .map(|i| {
            let correct = format!("Correct {}", i + 1);
            let wrong_a = format!("Wrong A {}", i + 1);
            let wrong_b = format!("Wrong B {}", i + 1);
            question(
                quiz_id,
                &format!("Question {}", i + 1),
                &[(correct.as_str(), true), (wrong_a.as_str(), false), (wrong_b.as_str(), false)],
            )
        })
        .collect()
}

pub fn correct_choice(question: &Question) -> Uuid {
    question.choices.iter().find(|c| c.is_correct).unwrap().id
}

pub fn wrong_choice(question: &Question) -> Uuid {
    question.choices.iter().find(|c| !c.is_correct).unwrap().id
}

impl QuizCatalog for MemoryStore {
    async fn get_quiz_snapshot(&self, quiz_id: Uuid) -> Result<Option<QuizSnapshot>, ServerError> {
        tokio::task::yield_now().await;
        let inner = self.lock();
        let snapshot = inner.quizzes.get(&quiz_id).map(|questions| QuizSnapshot {
            quiz_id,
            questions: questions.iter().map(Question::strip).collect(),
        });

        Ok(snapshot)
    }

    async fn get_questions(&self, question_ids: &[Uuid]) -> Result<Vec<Question>, ServerError> {
        tokio::task::yield_now().await;
        let inner = self.lock();
        let questions = inner
            .quizzes
            .values()
            .flatten()
            .filter(|q| question_ids.contains(&q.id))
            .cloned()
            .collect();

        Ok(questions)
    }
}

impl GameStore for MemoryStore {
    async fn create_game(&self, game: &Game, questions: &[GameQuestion]) -> Result<(), ServerError> {
        tokio::task::yield_now().await;
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(ServerError::Internal("Failed to persist game".into()));
        }

        let mut inner = self.lock();
        inner.games.insert(game.id, game.clone());
        inner.slots.extend_from_slice(questions);
        Ok(())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, ServerError> {
        tokio::task::yield_now().await;
        Ok(self.lock().games.get(&game_id).cloned())
    }

    async fn get_pending_question(&self, game_id: Uuid) -> Result<Option<GameQuestion>, ServerError> {
        tokio::task::yield_now().await;
        let pending = self
            .lock()
            .slots
            .iter()
            .filter(|gq| gq.game_id == game_id && !gq.is_answered())
            .min_by_key(|gq| gq.position)
            .cloned();

        Ok(pending)
    }

    async fn record_answer(&self, answer: &RecordedAnswer) -> Result<AnswerCommit, ServerError> {
        tokio::task::yield_now().await;
        let mut inner = self.lock();

        let finished = match inner.games.get(&answer.game_id) {
            None => return Err(ServerError::NotFound("Game does not exist".into())),
            Some(game) => game.is_finished(),
        };
        if finished {
            return Err(ServerError::Conflict(
                "This question has already been answered".into(),
            ));
        }

        let Some(slot) = inner.slots.iter_mut().find(|gq| {
            gq.id == answer.game_question_id && gq.game_id == answer.game_id && !gq.is_answered()
        }) else {
            return Err(ServerError::Conflict(
                "This question has already been answered".into(),
            ));
        };

        slot.choice_id = Some(answer.choice_id);
        slot.is_correct = answer.is_correct;
        slot.answered_at = Some(answer.answered_at);
        slot.updated_at = answer.answered_at;

        let game_finished = !inner
            .slots
            .iter()
            .any(|gq| gq.game_id == answer.game_id && !gq.is_answered());

        if game_finished {
            if let Some(game) = inner.games.get_mut(&answer.game_id) {
                game.finished_at = Some(answer.answered_at);
                game.updated_at = answer.answered_at;
            }
        }

        Ok(AnswerCommit { game_finished })
    }

    async fn get_game_questions(&self, game_id: Uuid) -> Result<Vec<GameQuestion>, ServerError> {
        tokio::task::yield_now().await;
        Ok(self.slots(game_id))
    }

    async fn list_user_games(&self, user_id: Uuid) -> Result<Vec<Game>, ServerError> {
        tokio::task::yield_now().await;
        let mut games: Vec<Game> = self
            .lock()
            .games
            .values()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        games.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(games)
    }

    async fn list_user_game_questions(&self, user_id: Uuid) -> Result<Vec<GameQuestion>, ServerError> {
        tokio::task::yield_now().await;
        let inner = self.lock();
        let questions = inner
            .slots
            .iter()
            .filter(|gq| {
                inner
                    .games
                    .get(&gq.game_id)
                    .is_some_and(|g| g.user_id == user_id)
            })
            .cloned()
            .collect();

        Ok(questions)
    }
}
