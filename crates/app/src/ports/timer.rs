//! Timer port: one-shot, cancellable and reschedulable timers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Identity of a timer, stable across reschedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// One arming of a timer.
///
/// Every call to [`TimerService::schedule_once`] or
/// [`TimerService::reschedule`] yields a new generation. The callback receives
/// the deadline that expired, which lets the owner recognise an expiry that
/// raced with a reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deadline {
    pub handle: TimerHandle,
    pub generation: u64,
}

/// Invoked once per expired deadline, on the timer service's execution context.
pub type TimerCallback = Arc<dyn Fn(Deadline) + Send + Sync>;

/// Errors reported by a timer service.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// The service has no execution context to run timers on.
    #[error("no runtime available to drive timers")]
    NoRuntime,

    /// The handle does not belong to this service.
    #[error("unknown timer {0}")]
    UnknownTimer(TimerHandle),

    /// The service cannot hold any more timers.
    #[error("timer capacity exhausted")]
    Exhausted,
}

/// A one-shot timer primitive.
///
/// Rescheduling replaces the pending deadline; cancelling prevents a deadline
/// that has not fired yet from firing at all.
pub trait TimerService: Send + Sync {
    /// Create a timer and arm it to call `callback` once after `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError`] when the timer cannot be created.
    fn schedule_once(
        &self,
        duration: Duration,
        callback: TimerCallback,
    ) -> Result<Deadline, TimerError>;

    /// Re-arm an existing timer with a new duration, whether or not it is
    /// currently pending.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::UnknownTimer`] for a handle this service did not create.
    fn reschedule(&self, handle: TimerHandle, duration: Duration) -> Result<Deadline, TimerError>;

    /// Disarm a timer. Cancelling an idle timer is a no-op.
    fn cancel(&self, handle: TimerHandle);
}

impl<T: TimerService + ?Sized> TimerService for Arc<T> {
    fn schedule_once(
        &self,
        duration: Duration,
        callback: TimerCallback,
    ) -> Result<Deadline, TimerError> {
        (**self).schedule_once(duration, callback)
    }

    fn reschedule(&self, handle: TimerHandle, duration: Duration) -> Result<Deadline, TimerError> {
        (**self).reschedule(handle, duration)
    }

    fn cancel(&self, handle: TimerHandle) {
        (**self).cancel(handle);
    }
}
