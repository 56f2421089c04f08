use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Decode the HTML entities the trivia backend embeds in every text field.
pub fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: CategoryId,
    name: String,
}

impl Category {
    pub fn new(id: CategoryId, name: &str) -> Self {
        Self {
            id,
            name: decode_entities(name),
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// The value the backend expects in a query string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Multiple,
    Boolean,
}

impl QuestionType {
    pub const ALL: [QuestionType; 2] = [QuestionType::Multiple, QuestionType::Boolean];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Multiple => "multiple",
            Self::Boolean => "boolean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Multiple => "Multiple Choice",
            Self::Boolean => "True or False",
        }
    }
}

/// A single trivia question with its text already entity-decoded.
///
/// The answer ordering is computed once on construction, so every render of
/// the same question sees the same list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    kind: QuestionType,
    difficulty: Difficulty,
    category: String,
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
    answers: Vec<String>,
}

impl Question {
    pub fn new(
        kind: QuestionType,
        difficulty: Difficulty,
        category: &str,
        text: &str,
        correct_answer: &str,
        incorrect_answers: &[String],
    ) -> Result<Self, DomainError> {
        let count = incorrect_answers.len();
        let shape_ok = match kind {
            QuestionType::Boolean => count == 1,
            QuestionType::Multiple => count >= 1,
        };
        if !shape_ok {
            return Err(DomainError::IncorrectAnswerCount {
                kind: kind.as_str(),
                count,
            });
        }

        let correct_answer = decode_entities(correct_answer);
        let incorrect_answers: Vec<String> = incorrect_answers
            .iter()
            .map(|answer| decode_entities(answer))
            .collect();

        let mut answers = Vec::with_capacity(incorrect_answers.len() + 1);
        answers.push(correct_answer.clone());
        answers.extend(incorrect_answers.iter().cloned());
        // Stable: answers that fold to the same key keep their input order.
        answers.sort_by_cached_key(|answer| answer.to_lowercase());

        Ok(Self {
            kind,
            difficulty,
            category: decode_entities(category),
            text: decode_entities(text),
            correct_answer,
            incorrect_answers,
            answers,
        })
    }

    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    /// Every candidate answer, sorted case-insensitively.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub questions: u64,
    pub pending: u64,
    pub verified: u64,
    pub rejected: u64,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
