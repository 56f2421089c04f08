use super::*;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;

fn recorder() -> (
    Arc<Mutex<Vec<CountdownSignal>>>,
    impl FnMut(CountdownSignal) -> bool + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |signal| {
        sink.lock().expect("lock").push(signal);
        true
    })
}

#[tokio::test(start_paused = true)]
async fn ticks_down_then_expires() {
    let (seen, notify) = recorder();
    let started = Instant::now();
    let countdown = Countdown::start(3, notify);

    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert!(countdown.is_finished());
    assert_eq!(
        seen.lock().expect("lock").as_slice(),
        [
            CountdownSignal::Tick(3),
            CountdownSignal::Tick(2),
            CountdownSignal::Tick(1),
            CountdownSignal::Tick(0),
            CountdownSignal::Expired,
        ]
    );
    assert!(started.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn zero_seconds_expires_immediately() {
    let (seen, notify) = recorder();
    let _countdown = Countdown::start(0, notify);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        seen.lock().expect("lock").as_slice(),
        [CountdownSignal::Tick(0), CountdownSignal::Expired]
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_countdown_never_expires() {
    let (seen, notify) = recorder();
    let countdown = Countdown::start(5, notify);
    tokio::time::sleep(Duration::from_millis(1500)).await;
    countdown.cancel();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let seen = seen.lock().expect("lock");
    assert!(!seen.contains(&CountdownSignal::Expired));
    assert_eq!(seen.last(), Some(&CountdownSignal::Tick(4)));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_stops_the_countdown() {
    let (seen, notify) = recorder();
    drop(Countdown::start(2, notify));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!seen.lock().expect("lock").contains(&CountdownSignal::Expired));
}

#[tokio::test(start_paused = true)]
async fn notify_returning_false_stops_early() {
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    let countdown = Countdown::start(10, move |_| {
        *counter.lock().expect("lock") += 1;
        false
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(countdown.is_finished());
    assert_eq!(*calls.lock().expect("lock"), 1);
}
