//! Fixed-size worker pool fed by a crossbeam channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{error, info};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use std::thread::JoinHandle;

/// Upper bound on concurrently running operations.
pub const MAX_WORKERS: usize = 3;

/// Unit of work accepted by the pool.
///
/// `reject` is called instead of `run` when the pool no longer accepts work,
/// so the submitter can still report a failure.
pub trait Job: Send + 'static {
    fn run(self: Box<Self>);
    fn reject(self: Box<Self>);
}

pub struct WorkerPool {
    sender: Mutex<Option<Sender<Box<dyn Job>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkerPool {
    /// Spawns `requested` workers, clamped to `1..=MAX_WORKERS`.
    pub fn new(requested: usize) -> std::io::Result<Self> {
        let size = requested.clamp(1, MAX_WORKERS);
        let (tx, rx) = unbounded::<Box<dyn Job>>();
        let mut workers = Vec::with_capacity(size);

        for index in 0..size {
            let rx = rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("todo-worker-{index}"))
                .spawn(move || worker_loop(index, rx))?;
            workers.push(handle);
        }

        info!("event=worker_pool module=runtime status=started size={size}");
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_running(&self) -> bool {
        self.sender
            .lock()
            .map(|sender| sender.is_some())
            .unwrap_or(false)
    }

    /// Queues `job`. Rejected jobs get `Job::reject` on the calling thread.
    pub fn submit(&self, job: Box<dyn Job>) -> bool {
        let sender = match self.sender.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        let Some(sender) = sender else {
            job.reject();
            return false;
        };
        match sender.send(job) {
            Ok(()) => true,
            Err(err) => {
                err.into_inner().reject();
                false
            }
        }
    }

    /// Stops accepting work, lets queued jobs finish and joins the workers.
    pub fn shutdown(&self) {
        let sender = self.sender.lock().ok().and_then(|mut guard| guard.take());
        if sender.is_none() {
            return;
        }
        drop(sender);

        let handles = match self.workers.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => Vec::new(),
        };
        let current = std::thread::current().id();
        for handle in handles {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                error!("event=worker_pool module=runtime status=error error_code=join_failed");
            }
        }
        info!("event=worker_pool module=runtime status=stopped size={}", self.size);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(index: usize, rx: Receiver<Box<dyn Job>>) {
    while let Ok(job) = rx.recv() {
        if catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
            error!("event=worker_job module=runtime status=error worker={index} error_code=job_panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Job, WorkerPool, MAX_WORKERS};
    use crossbeam_channel::{unbounded, Sender};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Probe {
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        done: Sender<bool>,
    }

    impl Job for Probe {
        fn run(self: Box<Self>) {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.running.fetch_sub(1, Ordering::SeqCst);
            let _ = self.done.send(true);
        }

        fn reject(self: Box<Self>) {
            let _ = self.done.send(false);
        }
    }

    #[test]
    fn size_is_clamped_to_supported_range() {
        assert_eq!(WorkerPool::new(0).expect("pool").size(), 1);
        assert_eq!(WorkerPool::new(64).expect("pool").size(), MAX_WORKERS);
    }

    #[test]
    fn concurrency_never_exceeds_pool_size() {
        let pool = WorkerPool::new(MAX_WORKERS).expect("pool should start");
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = unbounded();

        for _ in 0..12 {
            assert!(pool.submit(Box::new(Probe {
                running: Arc::clone(&running),
                peak: Arc::clone(&peak),
                done: tx.clone(),
            })));
        }
        for _ in 0..12 {
            assert!(rx
                .recv_timeout(Duration::from_secs(5))
                .expect("job should finish"));
        }
        assert!(peak.load(Ordering::SeqCst) <= MAX_WORKERS);
    }

    #[test]
    fn submit_after_shutdown_rejects_job() {
        let pool = WorkerPool::new(1).expect("pool should start");
        pool.shutdown();
        assert!(!pool.is_running());

        let (tx, rx) = unbounded();
        let accepted = pool.submit(Box::new(Probe {
            running: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
            done: tx,
        }));
        assert!(!accepted);
        assert!(!rx.try_recv().expect("reject should report"));
    }
}
