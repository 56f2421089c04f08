use std::time::Duration;

use tokio::task::JoinHandle;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownSignal {
    Tick(u64),
    Expired,
}

/// A one-shot countdown running on the tokio runtime.
///
/// `notify` sees `Tick(seconds)` immediately, one tick per second down to
/// `Tick(0)`, then `Expired`. Returning `false` from `notify` stops the
/// countdown early. Cancelling or dropping the handle stops it as well, so a
/// countdown never outlives its owner.
pub struct Countdown {
    task: JoinHandle<()>,
}

impl Countdown {
    pub fn start<F>(seconds: u64, mut notify: F) -> Self
    where
        F: FnMut(CountdownSignal) -> bool + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut remaining = seconds;
            loop {
                if !notify(CountdownSignal::Tick(remaining)) {
                    return;
                }
                if remaining == 0 {
                    break;
                }
                tokio::time::sleep(TICK).await;
                remaining -= 1;
            }
            notify(CountdownSignal::Expired);
        });
        Self { task }
    }

    pub fn cancel(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/countdown_tests.rs"]
mod tests;
