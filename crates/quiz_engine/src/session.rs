use std::{collections::HashMap, sync::Arc};

use shared::QuizParameters;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info};

use crate::{
    countdown::{Countdown, CountdownSignal},
    events::SessionEvent,
    machine::{Effect, FetchId, Input, SessionMachine, TimerId, Transition},
    source::QuestionSource,
};

/// The ordered stream of events for one session. It ends once the session
/// reaches `Result` or `Aborted`.
pub type SessionEvents = UnboundedReceiverStream<SessionEvent>;

/// Commands from the caller into a running session.
///
/// Dropping the handle cancels the session if it has not already finished.
pub struct SessionHandle {
    inputs: UnboundedSender<Input>,
}

impl SessionHandle {
    pub fn confirm(&self) {
        self.send(Input::Confirm);
    }

    /// Answer the question presented at `index`. An answer that arrives
    /// after the session has moved on is dropped.
    pub fn submit_answer(&self, index: usize, answer: impl Into<String>) {
        self.send(Input::Answer {
            index,
            answer: answer.into(),
        });
    }

    pub fn cancel(&self) {
        self.send(Input::Cancel);
    }

    /// Release the session; a session that is still running is cancelled.
    pub fn close(self) {}

    fn send(&self, input: Input) {
        if self.inputs.send(input).is_err() {
            debug!("session already ended; command dropped");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.inputs.send(Input::Cancel);
    }
}

/// The task that owns a [`SessionMachine`] and carries out its effects.
///
/// Caller commands, fetch results and countdown signals all arrive on one
/// channel, so the machine sees them one at a time and in order.
pub struct QuizSession {
    machine: SessionMachine,
    source: Arc<dyn QuestionSource>,
    inputs: UnboundedSender<Input>,
    events: UnboundedSender<SessionEvent>,
    timers: HashMap<TimerId, Countdown>,
    fetches: HashMap<FetchId, JoinHandle<()>>,
}

impl QuizSession {
    /// Spawn a session for `params` on the current tokio runtime.
    pub fn start(
        source: Arc<dyn QuestionSource>,
        params: QuizParameters,
    ) -> (SessionHandle, SessionEvents) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        info!(title = %params.title, "starting quiz session");
        let (machine, initial) = SessionMachine::start(params);
        let session = Self {
            machine,
            source,
            inputs: input_tx.clone(),
            events: event_tx,
            timers: HashMap::new(),
            fetches: HashMap::new(),
        };
        tokio::spawn(session.run(input_rx, initial));
        (
            SessionHandle { inputs: input_tx },
            UnboundedReceiverStream::new(event_rx),
        )
    }

    async fn run(mut self, mut inputs: UnboundedReceiver<Input>, initial: Transition) {
        self.dispatch(initial);
        while !self.machine.is_terminal() {
            let Some(input) = inputs.recv().await else {
                break;
            };
            let transition = self.machine.apply(input);
            self.dispatch(transition);
        }
        for (_, fetch) in self.fetches.drain() {
            fetch.abort();
        }
        self.timers.clear();
        info!(phase = ?self.machine.phase(), "quiz session ended");
    }

    fn dispatch(&mut self, transition: Transition) {
        for effect in transition.effects {
            self.perform(effect);
        }
        for event in transition.events {
            if self.events.send(event).is_err() {
                debug!("session events receiver dropped");
            }
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch { id, request } => {
                let source = Arc::clone(&self.source);
                let inputs = self.inputs.clone();
                let task = tokio::spawn(async move {
                    let result = source.questions(&request).await;
                    let _ = inputs.send(Input::Loaded { fetch: id, result });
                });
                self.fetches.insert(id, task);
            }
            Effect::AbortFetch(id) => {
                if let Some(task) = self.fetches.remove(&id) {
                    task.abort();
                }
            }
            Effect::StartTimer { id, seconds } => {
                let inputs = self.inputs.clone();
                let countdown = Countdown::start(seconds, move |signal| {
                    let input = match signal {
                        CountdownSignal::Tick(remaining) => Input::Tick {
                            timer: id,
                            remaining,
                        },
                        CountdownSignal::Expired => Input::Expired(id),
                    };
                    inputs.send(input).is_ok()
                });
                if let Some(previous) = self.timers.insert(id, countdown) {
                    previous.cancel();
                }
            }
            Effect::CancelTimer(id) => {
                if let Some(countdown) = self.timers.remove(&id) {
                    countdown.cancel();
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
