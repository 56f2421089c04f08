use serde::{Deserialize, Serialize};

use crate::{
    domain::{CategoryId, Difficulty, QuestionType},
    error::DomainError,
};

pub const DEFAULT_NUMBER_OF_QUESTIONS: u32 = 10;

/// How a countdown applies while a quiz is being taken.
///
/// Persisted as its ordinal; an ordinal outside the enum fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TimerMode {
    #[default]
    None = 0,
    PerQuestion = 1,
    WholeQuiz = 2,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::None, TimerMode::PerQuestion, TimerMode::WholeQuiz];

    pub fn description(self) -> &'static str {
        match self {
            Self::None => "No Timer",
            Self::PerQuestion => "Seconds per question",
            Self::WholeQuiz => "Seconds for the whole quiz",
        }
    }
}

impl TryFrom<u8> for TimerMode {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::PerQuestion),
            2 => Ok(Self::WholeQuiz),
            other => Err(DomainError::UnknownTimerMode(other)),
        }
    }
}

impl From<TimerMode> for u8 {
    fn from(value: TimerMode) -> Self {
        value as u8
    }
}

/// A saved, reusable description of how to build one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuizParametersRecord")]
pub struct QuizParameters {
    pub title: String,
    pub number_of_questions: u32,
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub timer_type: TimerMode,
    pub timer_value: u32,
}

impl QuizParameters {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            number_of_questions: DEFAULT_NUMBER_OF_QUESTIONS,
            category: None,
            difficulty: None,
            question_type: None,
            timer_type: TimerMode::None,
            timer_value: 0,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        if self.number_of_questions == 0 {
            return Err(DomainError::NoQuestions);
        }
        Ok(())
    }

    /// The countdown length, if this quiz is timed at all.
    pub fn timer_seconds(&self) -> Option<u64> {
        match self.timer_type {
            TimerMode::None => None,
            TimerMode::PerQuestion | TimerMode::WholeQuiz => Some(u64::from(self.timer_value)),
        }
    }
}

fn default_number_of_questions() -> u32 {
    DEFAULT_NUMBER_OF_QUESTIONS
}

#[derive(Deserialize)]
struct QuizParametersRecord {
    title: String,
    #[serde(default = "default_number_of_questions")]
    number_of_questions: u32,
    #[serde(default)]
    category: Option<CategoryId>,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    question_type: Option<QuestionType>,
    #[serde(default)]
    timer_type: TimerMode,
    #[serde(default)]
    timer_value: u32,
}

impl TryFrom<QuizParametersRecord> for QuizParameters {
    type Error = DomainError;

    fn try_from(record: QuizParametersRecord) -> Result<Self, Self::Error> {
        let params = Self {
            title: record.title,
            number_of_questions: record.number_of_questions,
            category: record.category,
            difficulty: record.difficulty,
            question_type: record.question_type,
            timer_type: record.timer_type,
            timer_value: record.timer_value,
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
#[path = "tests/quiz_tests.rs"]
mod tests;
