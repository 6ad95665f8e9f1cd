use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    game::models::{
        Game, GameDetail, GameQuestion, GameQuestionDetail, GameResult, GameSummary,
        ResultChoice, ResultQuestion,
    },
    quiz::models::Question,
};

/// Seconds spent on each slot, in slot order. The first slot is measured from
/// game creation, every later one from the previous answer. Unanswered slots
/// count as zero.
pub fn seconds_taken(game: &Game, questions: &[GameQuestion]) -> Vec<i64> {
    let mut reference = game.created_at;
    questions
        .iter()
        .map(|gq| match gq.answered_at {
            Some(answered_at) => {
                let seconds = (answered_at - reference).num_seconds().max(0);
                reference = answered_at;
                seconds
            }
            None => 0,
        })
        .collect()
}

pub fn summarize(game: &Game, questions: &[GameQuestion]) -> GameSummary {
    let correct_answers = questions
        .iter()
        .filter(|gq| gq.is_answered() && gq.is_correct)
        .count() as i64;

    GameSummary {
        id: game.id,
        quiz_id: game.quiz_id,
        is_finished: game.is_finished(),
        total_questions: questions.len() as i64,
        correct_answers,
        total_seconds_taken: seconds_taken(game, questions).iter().sum(),
        created_at: game.created_at,
        finished_at: game.finished_at,
    }
}

/// Full per-slot breakdown. Correctness of choices is only revealed for slots
/// that have been answered.
pub fn build_result(game: &Game, questions: &[GameQuestion], catalog: &[Question]) -> GameResult {
    let summary = summarize(game, questions);
    let by_id: HashMap<Uuid, &Question> = catalog.iter().map(|q| (q.id, q)).collect();
    let seconds = seconds_taken(game, questions);

    let game_questions = questions
        .iter()
        .zip(seconds)
        .map(|(gq, seconds_taken)| {
            let reveal = gq.is_answered();
            let question = by_id.get(&gq.question_id);
            let choice = match (question, gq.choice_id) {
                (Some(question), Some(choice_id)) => question
                    .find_choice(&choice_id)
                    .map(|c| ResultChoice::from_choice(c, reveal)),
                _ => None,
            };

            GameQuestionDetail {
                id: gq.id,
                game_id: gq.game_id,
                question_id: gq.question_id,
                question: question.map(|q| ResultQuestion::from_question(q, reveal)),
                choice_id: gq.choice_id,
                choice,
                position: gq.position,
                answered_at: gq.answered_at,
                seconds_taken,
                is_correct: gq.is_correct,
                created_at: gq.created_at,
                updated_at: gq.updated_at,
            }
        })
        .collect();

    GameResult {
        total_questions: summary.total_questions,
        correct_answers: summary.correct_answers,
        total_seconds_taken: summary.total_seconds_taken,
        game: GameDetail {
            id: game.id,
            user_id: game.user_id,
            quiz_id: game.quiz_id,
            is_finished: game.is_finished(),
            finished_at: game.finished_at,
            created_at: game.created_at,
            game_questions,
        },
    }
}

/// Groups a user's slots by game and summarizes each game, keeping the game order.
pub fn summarize_all(games: &[Game], questions: Vec<GameQuestion>) -> Vec<GameSummary> {
    let mut grouped: HashMap<Uuid, Vec<GameQuestion>> = HashMap::new();
    for gq in questions {
        grouped.entry(gq.game_id).or_default().push(gq);
    }

    games
        .iter()
        .map(|game| {
            let mut slots = grouped.remove(&game.id).unwrap_or_default();
            slots.sort_by_key(|gq| gq.position);
            summarize(game, &slots)
        })
        .collect()
}
