//! Raw response shapes of the Open Trivia DB endpoints.

use std::collections::HashMap;

use serde::Deserialize;
use shared::{Category, CategoryId, Counts, Difficulty, Question, QuestionType};

use crate::error::TriviaError;

#[derive(Debug, Deserialize)]
pub(crate) struct CategoriesEnvelope {
    pub trivia_categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawCategory {
    pub id: i64,
    pub name: String,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Category::new(CategoryId(raw.id), &raw.name)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsEnvelope {
    pub response_code: i64,
    #[serde(default)]
    pub results: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub difficulty: Difficulty,
    pub category: String,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = TriviaError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        Question::new(
            raw.kind,
            raw.difficulty,
            &raw.category,
            &raw.question,
            &raw.correct_answer,
            &raw.incorrect_answers,
        )
        .map_err(|err| TriviaError::Malformed(format!("question {:?}: {err}", raw.question)))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CountsEnvelope {
    pub overall: RawCounts,
    #[serde(default)]
    pub categories: HashMap<String, RawCounts>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct RawCounts {
    pub total_num_of_questions: u64,
    pub total_num_of_pending_questions: u64,
    pub total_num_of_verified_questions: u64,
    pub total_num_of_rejected_questions: u64,
}

impl From<RawCounts> for Counts {
    fn from(raw: RawCounts) -> Self {
        Counts {
            questions: raw.total_num_of_questions,
            pending: raw.total_num_of_pending_questions,
            verified: raw.total_num_of_verified_questions,
            rejected: raw.total_num_of_rejected_questions,
        }
    }
}
