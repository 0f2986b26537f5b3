//! Cooperative scheduling helpers for keeping input responsive while expensive work is pending.
//!
//! Everything here is single-threaded and clock-injected: callers pass `Instant`s explicitly, so
//! an event loop can drive the helpers from its own notion of "now" (and tests never sleep).
//!
//! - [`Debouncer`]: forwards a value only after it stopped changing for a delay.
//! - [`Deferred`]: an urgent value plus a lagging committed copy; "stale" while they differ.
//! - [`Transition`]: a latest-wins slot for low-priority state updates.

use std::time::Duration;
use std::time::Instant;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Delays a value until no newer value arrived for `delay`.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Records `value` and restarts the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Returns the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(v, _)| v),
            _ => None,
        }
    }

    /// Returns the pending value immediately, ignoring the deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, d)| *d)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// A value with an urgent and a deferred (committed) copy.
///
/// Urgent consumers (the input echoing keystrokes) read [`Deferred::value`]; expensive consumers
/// (row-model recomputation) read [`Deferred::deferred`], which only catches up on
/// [`Deferred::commit`].
#[derive(Clone, Debug, Default)]
pub struct Deferred<T> {
    value: T,
    deferred: T,
}

impl<T: Clone + PartialEq> Deferred<T> {
    pub fn new(value: T) -> Self {
        Self {
            deferred: value.clone(),
            value,
        }
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn deferred(&self) -> &T {
        &self.deferred
    }

    pub fn is_stale(&self) -> bool {
        self.value != self.deferred
    }

    /// Catches the deferred copy up. Returns the newly committed value when it changed.
    pub fn commit(&mut self) -> Option<T> {
        if !self.is_stale() {
            return None;
        }
        self.deferred = self.value.clone();
        Some(self.deferred.clone())
    }
}

/// A pending low-priority update. Starting a new transition interrupts the previous one.
#[derive(Clone, Debug)]
pub struct Transition<T> {
    pending: Option<T>,
    started: u64,
    superseded: u64,
}

impl<T> Default for Transition<T> {
    fn default() -> Self {
        Self {
            pending: None,
            started: 0,
            superseded: 0,
        }
    }
}

impl<T> Transition<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, value: T) {
        if self.pending.is_some() {
            self.superseded += 1;
            tracing::trace!(superseded = self.superseded, "transition interrupted");
        }
        self.started += 1;
        self.pending = Some(value);
    }

    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of transitions that were replaced before being applied.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}

/// Earliest of two optional deadlines.
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
