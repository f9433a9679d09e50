//! Time-explicit debounce primitive.
//!
//! A [`Debouncer`] holds a settled value plus at most one pending value with a
//! deadline. Each push replaces the pending value and restarts the quiet
//! window, so only the last value of a burst is ever emitted. Callers supply
//! `now` in milliseconds; the hook layer drives it with real timers and tests
//! drive it with a simulated clock.

use log::debug;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay_ms: u32,
    value: T,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: f64,
}

impl<T: Clone> Debouncer<T> {
    pub fn new(initial: T, delay_ms: u32) -> Self {
        Self {
            delay_ms,
            value: initial,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// The last emitted value.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any.
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Replace the pending value and restart the quiet window at `now`.
    pub fn push(&mut self, value: T, now: f64) {
        let deadline = now + f64::from(self.delay_ms);
        if self.pending.is_some() {
            debug!("Debounce window restarted, due at {deadline}");
        }
        self.pending = Some(Pending { value, deadline });
    }

    /// Emit the pending value if its window has elapsed.
    pub fn take_due(&mut self, now: f64) -> Option<T> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.flush(),
            _ => None,
        }
    }

    /// Emit the pending value immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<T> {
        let pending = self.pending.take()?;
        self.value = pending.value.clone();
        Some(pending.value)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Overwrite the settled value and drop anything pending.
    pub fn reset(&mut self, value: T) {
        self.pending = None;
        self.value = value;
    }
}
