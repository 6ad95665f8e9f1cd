use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog choice including its correctness flag. Never serialized for an
/// unanswered question; render through [`ChoiceView`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub content: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub content: String,
    pub choices: Vec<ChoiceView>,
}

/// What a game needs from a quiz at start: questions in their natural order,
/// choices without correctness.
#[derive(Debug, Clone)]
pub struct QuizSnapshot {
    pub quiz_id: Uuid,
    pub questions: Vec<QuestionView>,
}

impl From<Choice> for ChoiceView {
    fn from(choice: Choice) -> Self {
        Self {
            id: choice.id,
            question_id: choice.question_id,
            content: choice.content,
        }
    }
}

impl From<Question> for QuestionView {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            quiz_id: question.quiz_id,
            content: question.content,
            choices: question.choices.into_iter().map(ChoiceView::from).collect(),
        }
    }
}

impl Question {
    pub fn from_row(row: QuestionRow, choices: Vec<Choice>) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            content: row.content,
            choices,
        }
    }

    pub fn find_choice(&self, choice_id: &Uuid) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == *choice_id)
    }

    #[cfg(test)]
    pub fn strip(&self) -> QuestionView {
        QuestionView::from(self.clone())
    }
}
