use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classes of failure shared by every crate in the workspace.
///
/// Front ends switch on this rather than on concrete error types: a
/// `Transport` failure means the backend could not be reached at all, a
/// `BackendRejection` is a per-request refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    BackendRejection,
    DataCorruption,
    PreconditionViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("quiz title must not be empty")]
    EmptyTitle,
    #[error("a quiz needs at least one question")]
    NoQuestions,
    #[error("unknown timer type ordinal {0}")]
    UnknownTimerMode(u8),
    #[error("{kind} question has {count} incorrect answers")]
    IncorrectAnswerCount { kind: &'static str, count: usize },
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTimerMode(_) | Self::IncorrectAnswerCount { .. } => {
                ErrorKind::DataCorruption
            }
            Self::EmptyTitle | Self::NoQuestions => ErrorKind::PreconditionViolation,
        }
    }
}
