use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("run cancelled")]
pub struct Cancelled;

/// Pause/resume/cancel switch for a run.
///
/// Workers consult it only at the start of a probe attempt, so an attempt
/// that is already in flight always runs to completion. Cancellation is final.
#[derive(Debug, Clone)]
pub struct RunControl {
    tx: Arc<watch::Sender<RunState>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunState::Running);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> RunState {
        *self.tx.borrow()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == RunState::Cancelled
    }

    pub fn pause(&self) {
        self.transition(RunState::Running, RunState::Paused);
    }

    pub fn resume(&self) {
        self.transition(RunState::Paused, RunState::Running);
    }

    pub fn cancel(&self) {
        self.tx.send_replace(RunState::Cancelled);
    }

    /// Returns once the run is not paused; `Err` if it was cancelled.
    pub async fn checkpoint(&self) -> Result<(), Cancelled> {
        let mut rx = self.tx.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            match state {
                RunState::Running => return Ok(()),
                RunState::Cancelled => return Err(Cancelled),
                RunState::Paused => {}
            }
            if rx.changed().await.is_err() {
                return Err(Cancelled);
            }
        }
    }

    fn transition(&self, from: RunState, to: RunState) {
        self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        });
    }
}
