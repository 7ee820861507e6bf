//! Cancellable periodic refresh tasks
//!
//! A [`RefreshHandle`] owns its task: cancelling or dropping the handle aborts it, so a
//! replaced selection can never keep a stale refresh running.

use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshScheduler;

impl RefreshScheduler {
    /// Run `job` every `interval`, starting one interval from now.
    ///
    /// Must be called from within a tokio runtime. Ticks missed while the runtime is busy
    /// are skipped rather than bunched up.
    pub fn start<F>(name: &'static str, interval: Duration, mut job: F) -> RefreshHandle
    where
        F: FnMut() + Send + 'static,
    {
        let interval = interval.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                debug!(refresh = name, "refresh tick");
                job();
            }
        });

        RefreshHandle {
            name,
            task: Some(task),
        }
    }
}

/// Owner of one scheduled refresh task
#[derive(Debug)]
pub struct RefreshHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Handle with no task behind it
    pub fn idle(name: &'static str) -> Self {
        Self { name, task: None }
    }

    pub(crate) fn from_task(name: &'static str, task: JoinHandle<()>) -> Self {
        Self {
            name,
            task: Some(task),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Abort the task. Calling this more than once is a no-op.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(refresh = self.name, "refresh cancelled");
            task.abort();
        }
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
