//! Events a running session reports to whatever is displaying it.

use std::fmt;

use opentdb::TriviaError;
use shared::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Confirming { question_count: usize },
    Active,
    Result,
    Aborted,
}

#[derive(Debug)]
pub enum SessionEvent {
    StateChanged(SessionPhase),
    QuestionPresented {
        index: usize,
        total: usize,
        question: Question,
    },
    ScoreChanged {
        correct: usize,
        incorrect: usize,
    },
    TimerTick {
        remaining: u64,
    },
    Finished(QuizResult),
    Aborted(AbortReason),
}

#[derive(Debug)]
pub enum AbortReason {
    Cancelled,
    Fetch(TriviaError),
    NoQuestions,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "quiz cancelled"),
            Self::Fetch(err) => write!(f, "could not load the quiz: {err}"),
            Self::NoQuestions => write!(f, "the backend returned no questions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub question: Question,
    /// `None` when the question timed out without an answer.
    pub answer: Option<String>,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
    pub transcript: Vec<TranscriptEntry>,
}

impl QuizResult {
    pub fn score_line(&self) -> String {
        format!("Final score is {} out of {}.", self.correct, self.total)
    }
}
