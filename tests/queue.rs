//! Intake queue sequencing tests.
//!
//! These run under tokio's paused clock so timing-dependent properties
//! (settle delays, slow jobs) are deterministic.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use voicewatch::{AudioJob, IntakeQueue};

fn job(name: &str) -> AudioJob {
    AudioJob::new(PathBuf::from(format!("/watch/{}", name)), Utc::now())
}

/// Arrival order wins even when later arrivals would "settle" sooner:
/// A takes 3s to settle and process, B only 1s, C 2s. Serialization means
/// completion order is still A, B, C.
#[tokio::test(start_paused = true)]
async fn arrival_order_is_processing_order_despite_uneven_delays() {
    let queue = IntakeQueue::new();
    queue.enqueue(job("a.m4a"));
    queue.enqueue(job("b.m4a"));
    queue.enqueue(job("c.m4a"));

    fn settle(name: &str) -> Duration {
        match name {
            "a.m4a" => Duration::from_secs(3),
            "b.m4a" => Duration::from_secs(1),
            _ => Duration::from_secs(2),
        }
    }

    let completed = Arc::new(Mutex::new(Vec::new()));
    let recorder = completed.clone();

    queue
        .drain(move |job| {
            let recorder = recorder.clone();
            async move {
                let name = job.file_name();
                tokio::time::sleep(settle(&name)).await;
                recorder.lock().unwrap().push(name);
            }
        })
        .await;

    assert_eq!(*completed.lock().unwrap(), vec!["a.m4a", "b.m4a", "c.m4a"]);
}

/// Enqueueing D while A is mid-processing must not start a second drain;
/// D is processed by the drain already in progress, after the earlier jobs.
#[tokio::test(start_paused = true)]
async fn enqueue_during_drain_does_not_reenter() {
    let queue = Arc::new(IntakeQueue::new());
    queue.enqueue(job("a.m4a"));
    queue.enqueue(job("b.m4a"));
    queue.enqueue(job("c.m4a"));

    let completed = Arc::new(Mutex::new(Vec::new()));

    let drainer = {
        let queue = queue.clone();
        let recorder = completed.clone();
        tokio::spawn(async move {
            queue
                .drain(move |job| {
                    let recorder = recorder.clone();
                    async move {
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        recorder.lock().unwrap().push(job.file_name());
                    }
                })
                .await
        })
    };

    // Land D while A is still being processed, then contend for the gate.
    tokio::time::sleep(Duration::from_secs(1)).await;
    queue.enqueue(job("d.m4a"));
    let second_drain = queue.drain(|_| async {}).await;
    assert_eq!(second_drain, 0);

    let drained = drainer.await.unwrap();
    assert_eq!(drained, 4);
    assert_eq!(
        *completed.lock().unwrap(),
        vec!["a.m4a", "b.m4a", "c.m4a", "d.m4a"]
    );
}

/// After a drain returns to idle, a fresh drain can run again.
#[tokio::test(start_paused = true)]
async fn gate_reopens_after_idle() {
    let queue = IntakeQueue::new();

    queue.enqueue(job("a.m4a"));
    assert_eq!(queue.drain(|_| async {}).await, 1);

    queue.enqueue(job("b.m4a"));
    assert_eq!(queue.drain(|_| async {}).await, 1);
    assert!(queue.is_empty());
}
