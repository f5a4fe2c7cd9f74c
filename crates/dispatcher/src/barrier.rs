//! CompletionBarrier - in-flight delivery accounting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::warn;

/// Counter of in-flight units with a wait-until-zero operation
///
/// Cloning yields another handle to the same counter. `enter` is called by the
/// driver before each submission, `leave` from each completion callback.
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    in_flight: AtomicU64,
    entered: AtomicU64,
    completed: AtomicU64,
    notify: Notify,
}

impl CompletionBarrier {
    /// Create a barrier at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one in-flight unit
    pub fn enter(&self) {
        self.inner.entered.fetch_add(1, Ordering::AcqRel);
        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    /// Mark one in-flight unit as completed
    pub fn leave(&self) {
        self.inner.completed.fetch_add(1, Ordering::AcqRel);

        let prev = self
            .inner
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match prev {
            Ok(1) => self.inner.notify.notify_waiters(),
            Ok(_) => {}
            Err(_) => warn!("completion barrier left more often than entered"),
        }
    }

    /// Units currently in flight
    pub fn in_flight(&self) -> u64 {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Units ever entered
    pub fn entered(&self) -> u64 {
        self.inner.entered.load(Ordering::Acquire)
    }

    /// Completions observed
    pub fn completed(&self) -> u64 {
        self.inner.completed.load(Ordering::Acquire)
    }

    /// Wait until no unit is in flight
    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a leave() in between is not missed
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
