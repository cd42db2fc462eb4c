//! # minivalve-adapter-timer-tokio
//!
//! [`TimerService`] implementation backed by the tokio runtime.
//!
//! Each timer owns a slot holding its callback, its current generation and
//! the task sleeping towards its deadline. Arming spawns a new task and bumps
//! the generation; a task that wakes up only fires if its generation is still
//! current, so a cancelled or rescheduled deadline never fires even if its
//! task could not be aborted in time.
//!
//! ## Dependency rule
//!
//! Depends on `minivalve-app` (port traits) only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use minivalve_app::ports::{Deadline, TimerCallback, TimerError, TimerHandle, TimerService};

struct Slot {
    callback: TimerCallback,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Slots {
    next_handle: u64,
    timers: HashMap<TimerHandle, Slot>,
}

struct Shared {
    runtime: Handle,
    limit: usize,
    slots: Mutex<Slots>,
}

impl Shared {
    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, deadline: Deadline) {
        let callback = {
            let mut slots = self.lock_slots();
            let Some(slot) = slots.timers.get_mut(&deadline.handle) else {
                return;
            };
            if slot.generation != deadline.generation {
                tracing::trace!(timer = %deadline.handle, generation = deadline.generation, "superseded deadline woke up");
                return;
            }
            slot.task = None;
            slot.callback.clone()
        };
        tracing::trace!(timer = %deadline.handle, generation = deadline.generation, "timer fired");
        callback(deadline);
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let slots = self.slots.get_mut().unwrap_or_else(PoisonError::into_inner);
        for slot in slots.timers.values_mut() {
            if let Some(task) = slot.task.take() {
                task.abort();
            }
        }
    }
}

/// One-shot timers driven by a tokio runtime.
///
/// Methods may be called from any thread; timers run on the runtime the
/// service was created with, and callbacks are invoked on its worker threads.
pub struct TokioTimerService {
    shared: Arc<Shared>,
}

impl TokioTimerService {
    /// Create a service spawning its timers on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                runtime,
                limit: usize::MAX,
                slots: Mutex::new(Slots::default()),
            }),
        }
    }

    /// Create a service on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] outside of a tokio runtime.
    pub fn current() -> Result<Self, TimerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| TimerError::NoRuntime)
    }

    /// Cap the number of timers this service will create.
    #[must_use]
    pub fn with_limit(runtime: Handle, limit: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                runtime,
                limit,
                slots: Mutex::new(Slots::default()),
            }),
        }
    }

    /// Number of timers currently armed.
    #[must_use]
    pub fn armed(&self) -> usize {
        self.shared
            .lock_slots()
            .timers
            .values()
            .filter(|slot| slot.task.is_some())
            .count()
    }

    fn arm(&self, handle: TimerHandle, slot: &mut Slot, duration: Duration) -> Deadline {
        if let Some(task) = slot.task.take() {
            task.abort();
        }
        slot.generation += 1;
        let deadline = Deadline {
            handle,
            generation: slot.generation,
        };
        let at = Instant::now() + duration;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        slot.task = Some(self.shared.runtime.spawn(async move {
            tokio::time::sleep_until(at).await;
            if let Some(shared) = shared.upgrade() {
                shared.expire(deadline);
            }
        }));
        tracing::trace!(timer = %handle, generation = deadline.generation, ?duration, "timer armed");
        deadline
    }
}

impl TimerService for TokioTimerService {
    fn schedule_once(
        &self,
        duration: Duration,
        callback: TimerCallback,
    ) -> Result<Deadline, TimerError> {
        let mut slots = self.shared.lock_slots();
        if slots.timers.len() >= self.shared.limit {
            return Err(TimerError::Exhausted);
        }
        slots.next_handle += 1;
        let handle = TimerHandle::new(slots.next_handle);
        let mut slot = Slot {
            callback,
            generation: 0,
            task: None,
        };
        let deadline = self.arm(handle, &mut slot, duration);
        slots.timers.insert(handle, slot);
        Ok(deadline)
    }

    fn reschedule(&self, handle: TimerHandle, duration: Duration) -> Result<Deadline, TimerError> {
        let mut slots = self.shared.lock_slots();
        let slot = slots
            .timers
            .get_mut(&handle)
            .ok_or(TimerError::UnknownTimer(handle))?;
        Ok(self.arm(handle, slot, duration))
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut slots = self.shared.lock_slots();
        if let Some(slot) = slots.timers.get_mut(&handle) {
            slot.generation += 1;
            if let Some(task) = slot.task.take() {
                task.abort();
                tracing::trace!(timer = %handle, "timer cancelled");
            }
        }
    }
}
