//! Cancellable fixed-period polling
//!
//! Provides the generic polling loop the status machines are built on, plus
//! a supervisor that tracks one running loop per logical task name. A loop
//! runs its fetch+evaluate step on a fixed period until a terminal verdict,
//! tick exhaustion, or a stop signal; stop is cooperative — the loop is raced
//! against its stop channel and whichever resolves first wins, so an
//! in-flight fetch is abandoned rather than interrupted, and its result is
//! discarded.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Per-tick decision produced by a task's evaluate step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep polling.
    Continue,
    /// Terminal success; stop the loop.
    Success,
    /// Terminal failure; stop the loop.
    Failure,
}

/// How a polling loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Evaluate produced [`Verdict::Success`].
    Success,
    /// Evaluate produced [`Verdict::Failure`].
    Failure,
    /// The tick budget ran out without a terminal verdict.
    Exhausted,
    /// A stop signal preempted the loop.
    Stopped,
}

/// Run `fetch` then `evaluate` every `period` until a terminal verdict or
/// until `max_ticks` ticks have run.
///
/// The first tick starts immediately; the delay sits between ticks, so tick
/// `max_ticks` is never followed by a `max_ticks + 1`th fetch. Ticks are
/// strictly sequential: the next fetch only starts after the previous
/// evaluate returned. Fetch errors are handed to `evaluate` like any other
/// result — the loop itself never aborts on a transport failure.
pub async fn poll_until<T, E, F, Fut, V>(
    mut fetch: F,
    mut evaluate: V,
    period: Duration,
    max_ticks: u32,
) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    V: FnMut(&Result<T, E>) -> Verdict,
{
    for tick in 1..=max_ticks {
        let result = fetch().await;
        match evaluate(&result) {
            Verdict::Success => return PollOutcome::Success,
            Verdict::Failure => return PollOutcome::Failure,
            Verdict::Continue => {}
        }
        if tick < max_ticks {
            tokio::time::sleep(period).await;
        }
    }
    PollOutcome::Exhausted
}

struct RunningTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<PollOutcome>,
}

/// Tracks one cancellable polling loop per logical task name.
///
/// `start` races the supplied loop future against a stop channel; `stop`
/// flips the channel, preempting the loop at its next suspension point.
/// Starting a name that is already running replaces the old loop: the
/// previous task receives its stop signal before the new one is registered.
#[derive(Default)]
pub struct PollingSupervisor {
    tasks: Mutex<HashMap<String, RunningTask>>,
}

impl PollingSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` under `name`, replacing any loop already running there.
    pub fn start<F>(&self, name: impl Into<String>, task: F)
    where
        F: Future<Output = PollOutcome> + Send + 'static,
    {
        let name = name.into();
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = stop_rx.wait_for(|stopped| *stopped) => PollOutcome::Stopped,
                outcome = task => outcome,
            };
            tracing::debug!(task = %task_name, ?outcome, "polling task finished");
            outcome
        });

        let previous = self
            .tasks
            .lock()
            .unwrap()
            .insert(name.clone(), RunningTask { stop_tx, handle });
        if let Some(previous) = previous {
            let _ = previous.stop_tx.send(true);
            tracing::debug!(task = %name, "replaced running polling task");
        }
    }

    /// Signal the named loop to stop. Returns false when nothing was running
    /// under that name.
    pub fn stop(&self, name: &str) -> bool {
        match self.tasks.lock().unwrap().remove(name) {
            Some(task) => {
                let _ = task.stop_tx.send(true);
                true
            }
            None => false,
        }
    }

    /// Whether a loop is currently registered and unfinished under `name`.
    pub fn is_running(&self, name: &str) -> bool {
        self.tasks
            .lock()
            .unwrap()
            .get(name)
            .map(|task| !task.handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop every running loop.
    pub fn stop_all(&self) {
        for (_, task) in self.tasks.lock().unwrap().drain() {
            let _ = task.stop_tx.send(true);
        }
    }
}
