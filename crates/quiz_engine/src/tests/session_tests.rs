use super::*;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::StreamExt;
use opentdb::{QuestionRequest, TriviaError};
use shared::{Difficulty, Question, QuestionType, TimerMode};
use tokio::{sync::oneshot, time::Instant};

use crate::events::{AbortReason, QuizResult, SessionPhase};

struct ScriptedSource {
    questions: Mutex<Option<Result<Vec<Question>, TriviaError>>>,
    gate: tokio::sync::Mutex<Option<oneshot::Receiver<()>>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<QuestionRequest>>,
}

impl ScriptedSource {
    fn answering(result: Result<Vec<Question>, TriviaError>) -> Self {
        Self {
            questions: Mutex::new(Some(result)),
            gate: tokio::sync::Mutex::new(None),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn gated(result: Result<Vec<Question>, TriviaError>) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let source = Self::answering(result);
        *source.gate.try_lock().expect("fresh lock") = Some(rx);
        (source, tx)
    }
}

#[async_trait]
impl QuestionSource for ScriptedSource {
    async fn questions(&self, request: &QuestionRequest) -> Result<Vec<Question>, TriviaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().expect("lock").push(request.clone());
        if let Some(gate) = self.gate.lock().await.take() {
            let _ = gate.await;
        }
        self.questions
            .lock()
            .expect("lock")
            .take()
            .unwrap_or(Err(TriviaError::TokenEmpty))
    }
}

fn question(n: usize) -> Question {
    Question::new(
        QuestionType::Boolean,
        Difficulty::Easy,
        "Science",
        &format!("Statement {n}"),
        "True",
        &["False".to_string()],
    )
    .expect("question")
}

fn quiz(count: u32, timer_type: TimerMode, timer_value: u32) -> QuizParameters {
    let mut params = QuizParameters::new("Session test");
    params.number_of_questions = count;
    params.timer_type = timer_type;
    params.timer_value = timer_value;
    params
}

fn start(
    source: ScriptedSource,
    params: QuizParameters,
) -> (SessionHandle, SessionEvents, Arc<ScriptedSource>) {
    let source = Arc::new(source);
    let (handle, events) = QuizSession::start(source.clone(), params);
    (handle, events, source)
}

async fn next(events: &mut SessionEvents) -> SessionEvent {
    events.next().await.expect("session event")
}

/// Next event that is not a countdown tick.
async fn next_significant(events: &mut SessionEvents) -> SessionEvent {
    loop {
        match next(events).await {
            SessionEvent::TimerTick { .. } => continue,
            event => return event,
        }
    }
}

async fn until_presented(events: &mut SessionEvents, wanted: usize) {
    loop {
        if let SessionEvent::QuestionPresented { index, .. } = next(events).await {
            if index == wanted {
                return;
            }
        }
    }
}

async fn until_finished(events: &mut SessionEvents) -> QuizResult {
    loop {
        match next(events).await {
            SessionEvent::Finished(result) => return result,
            SessionEvent::Aborted(reason) => panic!("aborted: {reason}"),
            _ => {}
        }
    }
}

async fn until_confirming(events: &mut SessionEvents) -> usize {
    loop {
        match next(events).await {
            SessionEvent::StateChanged(SessionPhase::Confirming { question_count }) => {
                return question_count
            }
            SessionEvent::Aborted(reason) => panic!("aborted: {reason}"),
            _ => {}
        }
    }
}

#[tokio::test]
async fn untimed_quiz_runs_to_a_result() {
    let (handle, mut events, source) = start(
        ScriptedSource::answering(Ok((0..3).map(question).collect())),
        quiz(3, TimerMode::None, 0),
    );

    assert!(matches!(
        next(&mut events).await,
        SessionEvent::StateChanged(SessionPhase::Loading)
    ));
    assert_eq!(until_confirming(&mut events).await, 3);
    handle.confirm();
    for index in 0..3 {
        handle.submit_answer(index, "True");
    }

    let result = until_finished(&mut events).await;
    assert_eq!((result.correct, result.incorrect, result.total), (3, 0, 3));
    assert!(result.transcript.iter().all(|entry| entry.correct));
    assert!(events.next().await.is_none(), "stream ends after the result");
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(source.requests.lock().expect("lock")[0].amount, 3);
}

#[tokio::test(start_paused = true)]
async fn per_question_timeout_moves_on_with_a_fresh_countdown() {
    let (handle, mut events, _source) = start(
        ScriptedSource::answering(Ok((0..3).map(question).collect())),
        quiz(3, TimerMode::PerQuestion, 5),
    );
    until_confirming(&mut events).await;
    handle.confirm();
    until_presented(&mut events, 0).await;
    let shown = Instant::now();

    // Nobody answers question 0.
    let mut skipped_score = None;
    loop {
        match next(&mut events).await {
            SessionEvent::ScoreChanged { correct, incorrect } => {
                skipped_score = Some((correct, incorrect));
            }
            SessionEvent::QuestionPresented { index, .. } => {
                assert_eq!(index, 1);
                break;
            }
            _ => {}
        }
    }
    assert_eq!(skipped_score, Some((0, 1)));
    assert_eq!(shown.elapsed(), Duration::from_secs(5));
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::TimerTick { remaining: 5 }
    ));

    handle.submit_answer(1, "True");
    handle.submit_answer(2, "False");
    let result = until_finished(&mut events).await;
    assert_eq!(result.transcript[0].answer, None);
    assert!(!result.transcript[0].correct);
    assert_eq!((result.correct, result.incorrect), (1, 2));
}

#[tokio::test(start_paused = true)]
async fn answer_arriving_after_its_question_timed_out_is_dropped() {
    let (handle, mut events, _source) = start(
        ScriptedSource::answering(Ok((0..2).map(question).collect())),
        quiz(2, TimerMode::PerQuestion, 5),
    );
    until_confirming(&mut events).await;
    handle.confirm();
    until_presented(&mut events, 1).await;

    // "True" was meant for question 0 and would be correct on question 1.
    handle.submit_answer(0, "True");
    handle.submit_answer(1, "False");

    let result = until_finished(&mut events).await;
    assert_eq!(result.transcript[0].answer, None);
    assert_eq!(result.transcript[1].answer.as_deref(), Some("False"));
    assert_eq!((result.correct, result.incorrect), (0, 2));
}

#[tokio::test(start_paused = true)]
async fn whole_quiz_timeout_fills_unanswered_questions() {
    let (handle, mut events, _source) = start(
        ScriptedSource::answering(Ok((0..5).map(question).collect())),
        quiz(5, TimerMode::WholeQuiz, 30),
    );
    until_confirming(&mut events).await;
    let started = Instant::now();
    handle.confirm();
    until_presented(&mut events, 0).await;
    handle.submit_answer(0, "True");
    until_presented(&mut events, 1).await;
    handle.submit_answer(1, "True");
    until_presented(&mut events, 2).await;

    let result = until_finished(&mut events).await;
    assert_eq!(started.elapsed(), Duration::from_secs(30));
    assert_eq!((result.correct, result.incorrect, result.total), (2, 3, 5));
    assert!(result.transcript[2..]
        .iter()
        .all(|entry| entry.answer.is_none() && !entry.correct));
}

#[tokio::test(start_paused = true)]
async fn answering_everything_stops_the_whole_quiz_countdown() {
    let (handle, mut events, _source) = start(
        ScriptedSource::answering(Ok((0..2).map(question).collect())),
        quiz(2, TimerMode::WholeQuiz, 30),
    );
    until_confirming(&mut events).await;
    handle.confirm();
    handle.submit_answer(0, "True");
    handle.submit_answer(1, "True");

    let result = until_finished(&mut events).await;
    assert_eq!(result.correct, 2);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(events.next().await.is_none());
}

#[tokio::test]
async fn cancelling_while_loading_discards_the_late_fetch() {
    let (source, release) = ScriptedSource::gated(Ok(vec![question(0)]));
    let (handle, mut events, source) = start(source, quiz(1, TimerMode::None, 0));

    assert!(matches!(
        next(&mut events).await,
        SessionEvent::StateChanged(SessionPhase::Loading)
    ));
    handle.cancel();
    assert!(matches!(
        next_significant(&mut events).await,
        SessionEvent::StateChanged(SessionPhase::Aborted)
    ));
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::Aborted(AbortReason::Cancelled)
    ));

    let _ = release.send(());
    assert!(events.next().await.is_none(), "late result must not surface");
    assert!(source.calls.load(Ordering::SeqCst) <= 1);
}

#[tokio::test]
async fn backend_rejection_aborts_the_attempt() {
    let (_handle, mut events, _source) = start(
        ScriptedSource::answering(Err(TriviaError::NoResults)),
        quiz(50, TimerMode::None, 0),
    );

    let mut reason = None;
    while let Some(event) = events.next().await {
        if let SessionEvent::Aborted(why) = event {
            reason = Some(why);
        }
    }
    assert!(matches!(
        reason,
        Some(AbortReason::Fetch(TriviaError::NoResults))
    ));
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_session() {
    let (handle, mut events, _source) = start(
        ScriptedSource::answering(Ok(vec![question(0)])),
        quiz(1, TimerMode::None, 0),
    );
    until_confirming(&mut events).await;
    handle.close();

    assert!(matches!(
        next(&mut events).await,
        SessionEvent::StateChanged(SessionPhase::Aborted)
    ));
    assert!(matches!(
        next(&mut events).await,
        SessionEvent::Aborted(AbortReason::Cancelled)
    ));
    assert!(events.next().await.is_none());
}
