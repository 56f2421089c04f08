//! Drives one attempt at a quiz from loading, through confirmation and
//! timed answering, to a scored result.

pub mod countdown;
pub mod events;
pub mod machine;
pub mod session;
pub mod source;
pub mod summary;

pub use countdown::{Countdown, CountdownSignal};
pub use events::{AbortReason, QuizResult, SessionEvent, SessionPhase, TranscriptEntry};
pub use machine::{Effect, Input, SessionMachine, Transition};
pub use session::{QuizSession, SessionEvents, SessionHandle};
pub use source::QuestionSource;
