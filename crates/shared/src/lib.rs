pub mod domain;
pub mod error;
pub mod quiz;

pub use domain::{Category, CategoryId, Counts, Difficulty, Question, QuestionType};
pub use error::{DomainError, ErrorKind};
pub use quiz::{QuizParameters, TimerMode};
