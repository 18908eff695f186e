//! Pairs the worker pool with the main context.

use super::main_context::MainHandle;
use super::worker_pool::{Job, WorkerPool};
use crate::error::{CoreError, CoreResult};
use log::debug;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Runs operations on workers and delivers results on the main context.
#[derive(Clone)]
pub struct Executor {
    pool: Arc<WorkerPool>,
    main: MainHandle,
}

impl Executor {
    pub fn new(pool: Arc<WorkerPool>, main: MainHandle) -> Self {
        Self { pool, main }
    }

    /// Runs `op` on a worker, then `done(result)` on the main context.
    ///
    /// `done` is called exactly once as long as the main context is alive,
    /// including when the pool has shut down or `op` panicked.
    pub fn execute<T, Op, Done>(&self, op: Op, done: Done)
    where
        T: Send + 'static,
        Op: FnOnce() -> CoreResult<T> + Send + 'static,
        Done: FnOnce(CoreResult<T>) + Send + 'static,
    {
        self.pool.submit(Box::new(Dispatch {
            op,
            done,
            main: self.main.clone(),
            _result: PhantomData,
        }));
    }
}

struct Dispatch<T, Op, Done> {
    op: Op,
    done: Done,
    main: MainHandle,
    _result: PhantomData<fn() -> T>,
}

impl<T, Op, Done> Dispatch<T, Op, Done>
where
    T: Send + 'static,
    Done: FnOnce(CoreResult<T>) + Send + 'static,
{
    fn deliver(main: &MainHandle, done: Done, result: CoreResult<T>) {
        if !main.post(move || done(result)) {
            debug!("event=completion_dropped module=runtime reason=main_context_gone");
        }
    }
}

impl<T, Op, Done> Job for Dispatch<T, Op, Done>
where
    T: Send + 'static,
    Op: FnOnce() -> CoreResult<T> + Send + 'static,
    Done: FnOnce(CoreResult<T>) + Send + 'static,
{
    fn run(self: Box<Self>) {
        let Self { op, done, main, .. } = *self;
        let result = catch_unwind(AssertUnwindSafe(op))
            .unwrap_or_else(|_| Err(CoreError::Unavailable("operation panicked".to_string())));
        Self::deliver(&main, done, result);
    }

    fn reject(self: Box<Self>) {
        let Self { done, main, .. } = *self;
        Self::deliver(
            &main,
            done,
            Err(CoreError::Unavailable("worker pool is shut down".to_string())),
        );
    }
}
