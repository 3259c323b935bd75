use std::{
    sync::{
        Arc, Condvar, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use crate::foundation::error::{StampError, StampResult};

/// Shared cancellation flag observed by an export run between items and during pacing waits.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Create a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token and wake any waiter.
    pub fn cancel(&self) {
        let (flag, cv) = &*self.inner;
        *lock(flag) = true;
        cv.notify_all();
    }

    /// `true` once [`CancelToken::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        *lock(&self.inner.0)
    }

    /// Block for up to `timeout`. Returns `true` if the token fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cv) = &*self.inner;
        let guard = lock(flag);
        if *guard || timeout.is_zero() {
            return *guard;
        }
        match cv.wait_timeout_while(guard, timeout, |cancelled| !*cancelled) {
            Ok((guard, _)) => *guard,
            Err(poisoned) => *poisoned.into_inner().0,
        }
    }
}

/// What to do when an export is triggered while another is still running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReentryPolicy {
    /// Refuse the new run with [`StampError::ExportBusy`].
    #[default]
    Reject,
    /// Cancel the running export and start the new one.
    Supersede,
}

#[derive(Debug)]
enum RunState {
    Idle,
    Running { run_id: u64, cancel: CancelToken },
}

/// Guards entry to export runs: at most one run is current at a time.
///
/// Cloning shares the same state, so a UI thread and a worker can hold the same controller.
#[derive(Clone, Debug)]
pub struct ExportController {
    state: Arc<Mutex<RunState>>,
    next_id: Arc<AtomicU64>,
}

impl Default for ExportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(RunState::Idle)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// `true` while a run holds a ticket.
    pub fn is_running(&self) -> bool {
        matches!(*lock(&self.state), RunState::Running { .. })
    }

    /// Cancel the current run, if any.
    pub fn cancel_current(&self) {
        if let RunState::Running { cancel, .. } = &*lock(&self.state) {
            cancel.cancel();
        }
    }

    /// Claim the controller for a new run.
    pub fn begin(&self, policy: ReentryPolicy) -> StampResult<RunTicket> {
        let mut state = lock(&self.state);
        if let RunState::Running { run_id, cancel } = &*state {
            match policy {
                ReentryPolicy::Reject => return Err(StampError::ExportBusy),
                ReentryPolicy::Supersede => {
                    tracing::warn!(run_id, "superseding in-flight export run");
                    cancel.cancel();
                }
            }
        }

        let run_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancelToken::new();
        *state = RunState::Running {
            run_id,
            cancel: cancel.clone(),
        };
        Ok(RunTicket {
            state: self.state.clone(),
            run_id,
            cancel,
        })
    }
}

/// Proof that a run is current. Dropping it returns the controller to idle unless a newer run
/// has already taken over.
#[derive(Debug)]
pub struct RunTicket {
    state: Arc<Mutex<RunState>>,
    run_id: u64,
    cancel: CancelToken,
}

impl RunTicket {
    /// Token fired when this run is superseded or cancelled.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if matches!(&*state, RunState::Running { run_id, .. } if *run_id == self.run_id) {
            *state = RunState::Idle;
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/export/run.rs"]
mod tests;
