//! Fallback polling of a same-origin parent's theme
//!
//! The only recurring background activity. The task ticks a
//! [`ThemeSynchronizer`] on a fixed interval until its handle is cancelled
//! or dropped.

use super::sync::{ThemeSynchronizer, Trigger};
use crate::config::DEFAULT_POLL_INTERVAL_MS;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running poll task; dropping it stops the task
#[derive(Debug)]
pub struct PollHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling
    pub fn cancel(mut self) {
        self.signal();
    }

    /// Stop polling and wait for the task to exit
    pub async fn shutdown(mut self) {
        self.signal();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("Theme poll task ended abnormally: {}", e);
            }
        }
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn signal(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.signal();
    }
}

/// Start polling when the parent was confirmed readable on load
///
/// Returns `None` for top-level or cross-origin contexts. A zero interval
/// falls back to [`DEFAULT_POLL_INTERVAL_MS`].
pub fn start_parent_poll(
    sync: Arc<Mutex<ThemeSynchronizer>>,
    interval: Duration,
) -> Option<PollHandle> {
    let interval = if interval.is_zero() {
        log::warn!(
            "Theme poll interval must be non-zero, using {}ms",
            DEFAULT_POLL_INTERVAL_MS
        );
        Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
    } else {
        interval
    };

    let can_poll = match sync.lock() {
        Ok(guard) => guard.can_poll(),
        Err(e) => {
            log::error!("Theme synchronizer lock poisoned: {}", e);
            false
        }
    };
    if !can_poll {
        log::debug!("Parent theme not readable, polling disabled");
        return None;
    }

    let (cancel, mut cancelled) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick completes immediately; load already reconciled
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut cancelled => break,
                _ = ticker.tick() => {
                    if !tick(&sync) {
                        break;
                    }
                }
            }
        }
        log::debug!("Theme poll stopped");
    });

    log::debug!("Polling parent theme every {:?}", interval);
    Some(PollHandle {
        cancel: Some(cancel),
        task: Some(task),
    })
}

/// Run one poll reconciliation; `false` once the lock is poisoned
fn tick(sync: &Mutex<ThemeSynchronizer>) -> bool {
    match sync.lock() {
        Ok(mut guard) => {
            guard.reconcile(Trigger::PollTick);
            true
        }
        Err(e) => {
            log::error!("Theme synchronizer lock poisoned, stopping poll: {}", e);
            false
        }
    }
}
