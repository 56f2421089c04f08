//! The session state machine, free of any I/O.
//!
//! Every input yields a [`Transition`]: the events to report and the
//! effects (fetches, countdowns) the driver has to carry out. Results that
//! were issued against an earlier state carry the id of the fetch or
//! countdown that produced them and are dropped when that id is no longer
//! live.

use std::mem;

use opentdb::{QuestionRequest, TriviaError};
use shared::{Question, QuizParameters, TimerMode};
use tracing::debug;

use crate::events::{AbortReason, QuizResult, SessionEvent, SessionPhase, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchId(u64);

#[derive(Debug)]
pub enum Input {
    Loaded {
        fetch: FetchId,
        result: Result<Vec<Question>, TriviaError>,
    },
    Confirm,
    /// An answer to the question at `index`; ignored once the session has
    /// moved past that question.
    Answer {
        index: usize,
        answer: String,
    },
    Tick {
        timer: TimerId,
        remaining: u64,
    },
    Expired(TimerId),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { id: FetchId, request: QuestionRequest },
    AbortFetch(FetchId),
    StartTimer { id: TimerId, seconds: u64 },
    CancelTimer(TimerId),
}

#[derive(Debug, Default)]
pub struct Transition {
    pub events: Vec<SessionEvent>,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Loading { fetch: FetchId },
    Confirming,
    Active { index: usize },
    Finished,
    Aborted,
}

pub struct SessionMachine {
    params: QuizParameters,
    state: State,
    questions: Vec<Question>,
    transcript: Vec<TranscriptEntry>,
    correct: usize,
    incorrect: usize,
    live_timer: Option<TimerId>,
    next_timer: u64,
}

impl SessionMachine {
    /// Create a machine already in `Loading`, along with the transition
    /// that requests the questions.
    pub fn start(params: QuizParameters) -> (Self, Transition) {
        let fetch = FetchId(0);
        let request = QuestionRequest::from(&params);
        let machine = Self {
            params,
            state: State::Loading { fetch },
            questions: Vec::new(),
            transcript: Vec::new(),
            correct: 0,
            incorrect: 0,
            live_timer: None,
            next_timer: 0,
        };
        let transition = Transition {
            events: vec![SessionEvent::StateChanged(SessionPhase::Loading)],
            effects: vec![Effect::Fetch { id: fetch, request }],
        };
        (machine, transition)
    }

    pub fn params(&self) -> &QuizParameters {
        &self.params
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            State::Loading { .. } => SessionPhase::Loading,
            State::Confirming => SessionPhase::Confirming {
                question_count: self.questions.len(),
            },
            State::Active { .. } => SessionPhase::Active,
            State::Finished => SessionPhase::Result,
            State::Aborted => SessionPhase::Aborted,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, State::Finished | State::Aborted)
    }

    pub fn live_timer(&self) -> Option<TimerId> {
        self.live_timer
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            State::Active { index } => Some(index),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|index| self.questions.get(index))
    }

    pub fn apply(&mut self, input: Input) -> Transition {
        let mut out = Transition::default();
        match (self.state, input) {
            (State::Loading { fetch }, Input::Loaded { fetch: from, result }) if fetch == from => {
                self.loaded(result, &mut out);
            }
            (State::Confirming, Input::Confirm) => self.begin_quiz(&mut out),
            (State::Active { index }, Input::Answer { index: asked, answer })
                if asked == index =>
            {
                self.record(index, Some(answer), &mut out);
                self.advance(index, &mut out);
            }
            (State::Active { .. }, Input::Tick { timer, remaining })
                if self.live_timer == Some(timer) =>
            {
                out.events.push(SessionEvent::TimerTick { remaining });
            }
            (State::Active { index }, Input::Expired(timer)) if self.live_timer == Some(timer) => {
                self.expired(index, &mut out);
            }
            (State::Loading { fetch }, Input::Cancel) => {
                out.effects.push(Effect::AbortFetch(fetch));
                self.abort(AbortReason::Cancelled, &mut out);
            }
            (State::Confirming | State::Active { .. }, Input::Cancel) => {
                self.abort(AbortReason::Cancelled, &mut out);
            }
            (state, input) => {
                debug!(?state, ?input, "ignoring input that does not apply");
            }
        }
        out
    }

    fn loaded(&mut self, result: Result<Vec<Question>, TriviaError>, out: &mut Transition) {
        match result {
            Ok(questions) if questions.is_empty() => self.abort(AbortReason::NoQuestions, out),
            Ok(questions) => {
                self.questions = questions;
                self.state = State::Confirming;
                out.events.push(SessionEvent::StateChanged(self.phase()));
            }
            Err(err) => self.abort(AbortReason::Fetch(err), out),
        }
    }

    fn begin_quiz(&mut self, out: &mut Transition) {
        self.state = State::Active { index: 0 };
        out.events.push(SessionEvent::StateChanged(SessionPhase::Active));
        if self.params.timer_type == TimerMode::WholeQuiz {
            self.start_timer(out);
        }
        self.present(0, out);
    }

    fn present(&mut self, index: usize, out: &mut Transition) {
        out.events.push(SessionEvent::QuestionPresented {
            index,
            total: self.questions.len(),
            question: self.questions[index].clone(),
        });
        if self.params.timer_type == TimerMode::PerQuestion {
            self.start_timer(out);
        }
    }

    fn record(&mut self, index: usize, answer: Option<String>, out: &mut Transition) {
        let question = &self.questions[index];
        let correct = answer
            .as_deref()
            .is_some_and(|answer| question.is_correct(answer));
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.transcript.push(TranscriptEntry {
            question: question.clone(),
            answer,
            correct,
        });
        out.events.push(SessionEvent::ScoreChanged {
            correct: self.correct,
            incorrect: self.incorrect,
        });
    }

    fn advance(&mut self, index: usize, out: &mut Transition) {
        if self.params.timer_type == TimerMode::PerQuestion {
            self.cancel_timer(out);
        }
        let next = index + 1;
        if next < self.questions.len() {
            self.state = State::Active { index: next };
            self.present(next, out);
        } else {
            self.finish(out);
        }
    }

    fn expired(&mut self, index: usize, out: &mut Transition) {
        match self.params.timer_type {
            TimerMode::PerQuestion => {
                self.record(index, None, out);
                self.advance(index, out);
            }
            TimerMode::WholeQuiz => {
                self.cancel_timer(out);
                let unanswered = self.questions.len() - self.transcript.len();
                for question in &self.questions[self.transcript.len()..] {
                    self.transcript.push(TranscriptEntry {
                        question: question.clone(),
                        answer: None,
                        correct: false,
                    });
                }
                self.incorrect += unanswered;
                out.events.push(SessionEvent::ScoreChanged {
                    correct: self.correct,
                    incorrect: self.incorrect,
                });
                self.finish(out);
            }
            TimerMode::None => {
                debug!("countdown expired on an untimed quiz");
            }
        }
    }

    fn finish(&mut self, out: &mut Transition) {
        self.cancel_timer(out);
        self.state = State::Finished;
        let transcript = mem::take(&mut self.transcript);
        out.events.push(SessionEvent::StateChanged(SessionPhase::Result));
        out.events.push(SessionEvent::Finished(QuizResult {
            correct: self.correct,
            incorrect: self.incorrect,
            total: transcript.len(),
            transcript,
        }));
    }

    fn abort(&mut self, reason: AbortReason, out: &mut Transition) {
        self.cancel_timer(out);
        self.state = State::Aborted;
        out.events.push(SessionEvent::StateChanged(SessionPhase::Aborted));
        out.events.push(SessionEvent::Aborted(reason));
    }

    fn start_timer(&mut self, out: &mut Transition) {
        self.cancel_timer(out);
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.live_timer = Some(id);
        out.effects.push(Effect::StartTimer {
            id,
            seconds: u64::from(self.params.timer_value),
        });
    }

    fn cancel_timer(&mut self, out: &mut Transition) {
        if let Some(id) = self.live_timer.take() {
            out.effects.push(Effect::CancelTimer(id));
        }
    }
}

#[cfg(test)]
#[path = "tests/machine_tests.rs"]
mod tests;
