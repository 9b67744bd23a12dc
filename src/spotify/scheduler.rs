use std::{future::Future, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, Semaphore, watch},
    time::{Instant, sleep_until, timeout},
};
use tracing::{trace, warn};

use crate::error::ApiError;

/// Admits provider calls at bounded concurrency with fixed spacing.
///
/// A task first takes a concurrency slot, then passes the admission gate.
/// Both are FIFO, so with a single slot tasks run strictly in submission
/// order without overlapping. The gate holds back admissions while a pause
/// window is open and keeps at least `spacing` between two admissions.
pub struct RateLimitedScheduler {
    slots: Arc<Semaphore>,
    gate: Mutex<Option<Instant>>,
    paused_until: watch::Sender<Option<Instant>>,
    spacing: Duration,
    task_timeout: Duration,
}

impl RateLimitedScheduler {
    pub fn new(concurrency: usize, spacing: Duration, task_timeout: Duration) -> Self {
        let (paused_until, _) = watch::channel(None);
        Self {
            slots: Arc::new(Semaphore::new(concurrency.max(1))),
            gate: Mutex::new(None),
            paused_until,
            spacing,
            task_timeout,
        }
    }

    /// Runs `task` once admitted, bounded by the default task timeout.
    pub async fn run<T, Fut>(&self, task: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.run_with_timeout(self.task_timeout, task).await
    }

    /// Runs `task` once admitted, failing with [`ApiError::Timeout`] if it
    /// takes longer than `limit` after admission.
    pub async fn run_with_timeout<T, Fut>(&self, limit: Duration, task: Fut) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let _slot = self.slots.acquire().await.map_err(|_| ApiError::QueueClosed)?;
        self.admit().await;

        match timeout(limit, task).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(limit)),
        }
    }

    /// Stops admissions for `duration` from now.
    ///
    /// Calling it again while paused replaces the remaining window; pauses
    /// never add up.
    pub fn pause_for(&self, duration: Duration) {
        warn!(duration_ms = duration.as_millis() as u64, "pausing request queue");
        self.paused_until.send_replace(Some(Instant::now() + duration));
    }

    /// Stops admitting tasks. Tasks waiting for a slot and every later
    /// submission fail with [`ApiError::QueueClosed`]; running tasks finish.
    pub fn close(&self) {
        self.slots.close();
    }

    /// Returns `true` while a pause window is open.
    pub fn is_paused(&self) -> bool {
        matches!(*self.paused_until.borrow(), Some(until) if until > Instant::now())
    }

    async fn admit(&self) {
        let mut next_admission = self.gate.lock().await;
        let mut pause = self.paused_until.subscribe();

        loop {
            let paused_until = *pause.borrow_and_update();
            if let Some(until) = paused_until.filter(|until| *until > Instant::now()) {
                trace!("admission held by pause window");
                tokio::select! {
                    _ = sleep_until(until) => {}
                    _ = pause.changed() => {}
                }
                continue;
            }

            if let Some(at) = (*next_admission).filter(|at| *at > Instant::now()) {
                sleep_until(at).await;
                continue;
            }

            break;
        }

        *next_admission = Some(Instant::now() + self.spacing);
    }
}
