use std::time::{Duration, Instant};

/// Trailing-edge debounce over an explicit clock.
///
/// Every `schedule` cancels the pending value and restarts the window; only
/// the last value of a quiet window is published. Publishing a value equal to
/// the current one is not a transition.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    window: Duration,
    published: T,
    version: u64,
    pending: Option<Pending<T>>,
}

#[derive(Clone, Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq,
{
    pub fn new(initial: T, window: Duration) -> Self {
        Self {
            window,
            published: initial,
            version: 0,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn published(&self) -> &T {
        &self.published
    }

    /// Number of publications so far.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.window,
        });
    }

    /// Publishes the pending value once its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        self.flush()
    }

    /// Publishes the pending value immediately.
    pub fn flush(&mut self) -> Option<&T> {
        let pending = self.pending.take()?;
        if pending.value == self.published {
            return None;
        }
        self.published = pending.value;
        self.version += 1;
        Some(&self.published)
    }

    /// Drops the pending value. Returns whether one existed.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}
