//! In-flight work counter with a zero-crossing signal

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts registered units of work and wakes waiters when the count hits zero
///
/// Registration must happen before the matching arrival on the same logical
/// path; the counter then only reaches zero once every path is terminal.
#[derive(Debug, Default)]
pub struct WorkCounter {
    pending: AtomicUsize,
    idle: Notify,
}

impl WorkCounter {
    /// Creates a counter holding `initial` units
    pub fn new(initial: usize) -> Self {
        Self {
            pending: AtomicUsize::new(initial),
            idle: Notify::new(),
        }
    }

    /// Registers one more unit of work
    pub fn register(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Completes one unit of work, waking waiters if it was the last
    pub fn arrive(&self) {
        let previous = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "arrive() without matching register()");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// Waits until the count reaches zero
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register interest before checking so a concurrent arrive() is not missed
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_idle_when_empty() {
        let counter = WorkCounter::new(0);
        assert!(counter.is_idle());
        counter.wait_idle().await;
    }

    #[tokio::test]
    async fn test_register_and_arrive() {
        let counter = WorkCounter::new(1);
        counter.register();
        assert_eq!(counter.pending(), 2);

        counter.arrive();
        assert!(!counter.is_idle());
        counter.arrive();
        assert!(counter.is_idle());
    }

    #[tokio::test]
    async fn test_wait_blocks_until_last_arrival() {
        let counter = Arc::new(WorkCounter::new(1));

        let waiter = {
            let counter = counter.clone();
            tokio::spawn(async move { counter.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        counter.arrive();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_arrivals() {
        let counter = Arc::new(WorkCounter::new(1));
        for _ in 0..100 {
            counter.register();
        }

        let mut handles = Vec::new();
        for _ in 0..100 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move { counter.arrive() }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.pending(), 1);
        counter.arrive();
        tokio::time::timeout(Duration::from_secs(1), counter.wait_idle())
            .await
            .expect("counter should be idle");
    }
}
