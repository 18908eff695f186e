//! Single designated completion context.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

type MainTask = Box<dyn FnOnce() + Send + 'static>;

/// Queue of completions drained by the owning (UI) thread.
pub struct MainContext {
    tx: Sender<MainTask>,
    rx: Receiver<MainTask>,
}

/// Cloneable posting side of a [`MainContext`].
#[derive(Clone)]
pub struct MainHandle {
    tx: Sender<MainTask>,
}

impl MainHandle {
    /// Queues `task` for the main context. Returns `false` when it is gone.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> bool {
        self.tx.send(Box::new(task)).is_ok()
    }
}

impl Default for MainContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MainContext {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> MainHandle {
        MainHandle {
            tx: self.tx.clone(),
        }
    }

    /// Runs every queued completion without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for one completion and runs it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Runs completions until `done()` holds or `timeout` elapses.
    pub fn run_until(&self, mut done: impl FnMut() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !done() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !self.run_next(remaining) {
                return done();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::MainContext;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn posted_tasks_run_on_the_draining_thread() {
        let main = MainContext::new();
        let handle = main.handle();
        let (tx, rx) = crossbeam_channel::unbounded();

        std::thread::spawn(move || {
            handle.post(move || {
                let _ = tx.send(std::thread::current().id());
            });
        })
        .join()
        .expect("poster thread should finish");

        assert!(main.run_next(Duration::from_secs(1)));
        assert_eq!(
            rx.try_recv().expect("task should have run"),
            std::thread::current().id()
        );
    }

    #[test]
    fn run_until_times_out_when_nothing_arrives() {
        let main = MainContext::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        assert!(!main.run_until(
            move || seen.load(Ordering::SeqCst) > 0,
            Duration::from_millis(20)
        ));
        assert_eq!(main.run_pending(), 0);
    }
}
