//! An append-only per-run sequence of [`Frame`]s with a wake-up
//! notification, built on `Notify` since subscribers need "more data became
//! available", not a one-shot event.

use std::sync::Mutex;

use tokio::sync::Notify;

use super::frame::Frame;

struct State {
    frames: Vec<Frame>,
    closed: bool,
}

/// The `(frame?, nextCursor, closed)` result of a single cursor read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub frame: Option<Frame>,
    pub next_cursor: usize,
    pub closed: bool,
}

/// One run's append-only frame log. `closed` plays the role of a trailing
/// sentinel entry without storing a null element at the tail of the vector:
/// reaching `closed` with no frame left to read carries the same meaning
/// without a union type for every element.
pub struct EventLog {
    state: Mutex<State>,
    notify: Notify,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                frames: Vec::new(),
                closed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Appends a frame and wakes every waiter. A no-op once the stream is
    /// closed: nothing may follow the sentinel.
    pub fn append(&self, frame: Frame) {
        {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.frames.push(frame);
        }
        self.notify.notify_waiters();
    }

    /// Marks the stream closed. Idempotent; wakes every waiter so they can
    /// observe the terminal state.
    pub fn close_stream(&self) {
        {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
        }
        self.notify.notify_waiters();
    }

    /// Reads the frame at `cursor`, if any.
    #[must_use]
    pub fn read(&self, cursor: usize) -> ReadResult {
        let state = self.lock();
        match state.frames.get(cursor) {
            Some(frame) => ReadResult {
                frame: Some(frame.clone()),
                next_cursor: cursor + 1,
                closed: false,
            },
            None => ReadResult {
                frame: None,
                next_cursor: cursor,
                closed: state.closed,
            },
        }
    }

    /// Suspends until `read(cursor)` would return a frame or the stream is
    /// closed. Registers interest before checking state to avoid the
    /// classic notify-before-wait race.
    pub async fn wait_for_more(&self, cursor: usize) {
        loop {
            let notified = self.notify.notified();
            {
                let state = self.lock();
                if cursor < state.frames.len() || state.closed {
                    return;
                }
            }
            notified.await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventlog::frame::{FrameOp, Plot};

    fn sample_frame() -> Frame {
        Frame::point(Plot::Throughput, 0, FrameOp::Extend, 0.0, 1.0)
    }

    #[test]
    fn read_past_the_end_reports_not_closed() {
        let log = EventLog::new();
        let result = log.read(0);
        assert_eq!(result.frame, None);
        assert_eq!(result.next_cursor, 0);
        assert!(!result.closed);
    }

    #[test]
    fn append_then_read_advances_cursor() -> Result<(), String> {
        let log = EventLog::new();
        log.append(sample_frame());

        let result = log.read(0);
        if result.frame != Some(sample_frame()) {
            return Err(format!("unexpected frame: {:?}", result.frame));
        }
        if result.next_cursor != 1 {
            return Err(format!("unexpected cursor: {}", result.next_cursor));
        }
        Ok(())
    }

    #[test]
    fn close_stream_is_idempotent_and_observed_by_read() {
        let log = EventLog::new();
        log.close_stream();
        log.close_stream();

        let result = log.read(0);
        assert!(result.closed);
        assert_eq!(result.frame, None);
    }

    #[test]
    fn append_after_close_is_ignored() {
        let log = EventLog::new();
        log.close_stream();
        log.append(sample_frame());
        assert_eq!(log.len(), 0);
    }

    #[tokio::test]
    async fn wait_for_more_returns_once_a_frame_is_appended() -> Result<(), String> {
        let log = std::sync::Arc::new(EventLog::new());
        let waiter = {
            let log = log.clone();
            tokio::spawn(async move {
                log.wait_for_more(0).await;
            })
        };

        tokio::task::yield_now().await;
        log.append(sample_frame());

        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .map_err(|_| "wait_for_more did not return in time".to_owned())?
            .map_err(|err| format!("waiter task panicked: {err}"))
    }

    #[tokio::test]
    async fn wait_for_more_returns_once_closed() -> Result<(), String> {
        let log = std::sync::Arc::new(EventLog::new());
        let waiter = {
            let log = log.clone();
            tokio::spawn(async move {
                log.wait_for_more(0).await;
            })
        };

        tokio::task::yield_now().await;
        log.close_stream();

        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .map_err(|_| "wait_for_more did not return in time".to_owned())?
            .map_err(|err| format!("waiter task panicked: {err}"))
    }
}
