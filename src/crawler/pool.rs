//! Fixed-size worker pool
//!
//! A pool owns `size` long-lived Tokio tasks that pull boxed futures from an
//! unbounded queue and run them one at a time. At most `size` jobs of a pool
//! are therefore in progress at once, while submission never waits.

use crate::CrawlError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A unit of work accepted by a [`WorkerPool`]
pub type Job = BoxFuture<'static, ()>;

type SharedReceiver = Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>;

pub struct WorkerPool {
    name: &'static str,
    size: usize,
    sender: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl WorkerPool {
    /// Spawns `size` workers on the current Tokio runtime
    ///
    /// # Returns
    ///
    /// * `Err(CrawlError::InvalidPoolSize)` - `size` is zero
    /// * `Err(CrawlError::NoRuntime)` - called outside a Tokio runtime
    pub fn new(name: &'static str, size: usize) -> Result<Self, CrawlError> {
        if size == 0 {
            return Err(CrawlError::InvalidPoolSize { pool: name, size });
        }
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| CrawlError::NoRuntime(name))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let receiver: SharedReceiver = Arc::new(tokio::sync::Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| handle.spawn(worker_loop(name, id, receiver.clone())))
            .collect();

        tracing::debug!("Started {} pool with {} workers", name, size);

        Ok(Self {
            name,
            size,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            closed: AtomicBool::new(false),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Queues a job without waiting for it to run
    pub fn submit(&self, job: Job) -> Result<(), CrawlError> {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match sender.as_ref() {
            Some(sender) => sender
                .send(job)
                .map_err(|_| CrawlError::PoolClosed(self.name)),
            None => Err(CrawlError::PoolClosed(self.name)),
        }
    }

    /// Stops accepting work, drops queued jobs and cancels running ones
    ///
    /// Running jobs are cancelled at their next await point. Calling this
    /// more than once is a no-op.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for worker in workers {
            worker.abort();
        }

        tracing::debug!("Shut down {} pool", self.name);
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn worker_loop(name: &'static str, id: usize, receiver: SharedReceiver) {
    loop {
        // Only one idle worker waits on the queue at a time; the lock is
        // released before the job runs.
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        if AssertUnwindSafe(job).catch_unwind().await.is_err() {
            tracing::error!("Job panicked in {} worker {}", name, id);
        }
    }
    tracing::trace!("{} worker {} exiting", name, id);
}
