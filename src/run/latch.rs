//! Level-triggered latches used for `runningLatch`/`stoppingLatch`.
//! `tokio::sync::broadcast` delivers *events*: a task that subscribes after
//! the send already happened never observes it. A latch needs *state*: a
//! virtual user that checks `stoppingLatch` a minute after it was set must
//! still see it set. A `watch` channel carries "current value", so it is
//! the right primitive here.

use tokio::sync::watch;

/// A boolean latch: starts cleared, can be set, never clears itself.
#[derive(Clone)]
pub struct Latch {
    tx: watch::Sender<bool>,
}

impl Latch {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn set(&self) {
        self.tx.send_if_modified(|value| {
            let changed = !*value;
            *value = true;
            changed
        });
    }

    /// Clears the latch. Used by `pause` to drop `runningLatch` back to
    /// unset.
    pub fn clear(&self) {
        self.tx.send_if_modified(|value| {
            let changed = *value;
            *value = false;
            changed
        });
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspends until the latch is set. Returns immediately if already set.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_cleared() {
        let latch = Latch::new();
        assert!(!latch.is_set());
    }

    #[test]
    fn set_is_idempotent_and_observed() {
        let latch = Latch::new();
        latch.set();
        latch.set();
        assert!(latch.is_set());
    }

    #[test]
    fn clear_resets_to_unset() {
        let latch = Latch::new();
        latch.set();
        latch.clear();
        assert!(!latch.is_set());
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_set() -> Result<(), String> {
        let latch = Latch::new();
        latch.set();
        tokio::time::timeout(Duration::from_millis(50), latch.wait())
            .await
            .map_err(|_| "wait() should have returned immediately".to_owned())
    }

    #[tokio::test]
    async fn wait_unblocks_once_set_from_another_clone() -> Result<(), String> {
        let latch = Latch::new();
        let waiter = latch.clone();
        let handle = tokio::spawn(async move {
            waiter.wait().await;
        });

        tokio::task::yield_now().await;
        latch.set();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .map_err(|_| "wait() did not unblock in time".to_owned())?
            .map_err(|err| format!("waiter task panicked: {err}"))
    }
}
