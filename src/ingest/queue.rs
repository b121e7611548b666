//! FIFO intake queue with a single-slot drain gate.
//!
//! Jobs arrive from the watcher task and the startup scan; processing is
//! strictly sequential. The queue is deliberately in-memory only: recovery
//! after a restart is structural (the intake directory is re-scanned), so
//! there is no bookkeeping to persist.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use crate::domain::AudioJob;

/// Ordered, single-consumer queue.
///
/// `drain` is reentrant-safe: the draining flag is a mutual-exclusion gate,
/// not a counter. A concurrent second `drain` returns immediately, and jobs
/// enqueued while a drain is active are picked up by that drain before the
/// queue goes idle — the idle transition happens under the same lock as the
/// emptiness check, so a late enqueue cannot be stranded.
pub struct IntakeQueue {
    inner: Mutex<Inner>,
}

struct Inner {
    jobs: VecDeque<AudioJob>,
    draining: bool,
}

impl IntakeQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                jobs: VecDeque::new(),
                draining: false,
            }),
        }
    }

    /// Append a job in arrival order.
    pub fn enqueue(&self, job: AudioJob) {
        self.inner.lock().unwrap().jobs.push_back(job);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Process queued jobs in arrival order, one at a time, until the queue
    /// is empty. Returns the number processed — immediately 0 if another
    /// drain is already running.
    pub async fn drain<F, Fut>(&self, mut process: F) -> usize
    where
        F: FnMut(AudioJob) -> Fut,
        Fut: Future<Output = ()>,
    {
        if !self.try_begin() {
            return 0;
        }

        let mut processed = 0;
        while let Some(job) = self.pop_or_idle() {
            process(job).await;
            processed += 1;
        }
        processed
    }

    fn try_begin(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.draining {
            return false;
        }
        inner.draining = true;
        true
    }

    fn pop_or_idle(&self) -> Option<AudioJob> {
        let mut inner = self.inner.lock().unwrap();
        match inner.jobs.pop_front() {
            Some(job) => Some(job),
            None => {
                inner.draining = false;
                None
            }
        }
    }
}

impl Default for IntakeQueue {
    fn default() -> Self {
        Self::new()
    }
}
