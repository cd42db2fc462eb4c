//! Valve controller: the valve state machine and its auto-off timer.
//!
//! The controller is the single owner of the valve state. Every entry point
//! (local command, inbound attribute write, timer expiry) takes the same lock,
//! so they may arrive from any thread.
//!
//! After each state change the controller runs one reaction:
//! 1. arm, re-arm or disarm the turn-off timer for the current state and on-time
//! 2. notify the registered observer with the current state
//!
//! Local commands additionally mirror the on/off value into the network layer.
//! Inbound writes do not, because the network layer already holds the value.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use minivalve_domain::attribute::{AttributeValue, AttributeWrite};
use minivalve_domain::endpoint::EndpointDescriptor;
use minivalve_domain::error::ValveError;
use minivalve_domain::id::{AttributeId, ClusterId, EndpointId};
use minivalve_domain::valve::{OnTime, TimerAction, ValvePhase};

use crate::ports::{AttributeStore, Deadline, Endpoint, TimerCallback, TimerHandle, TimerService};

/// Callback invoked with the new state after every valve change.
pub type ValveObserver = Box<dyn Fn(bool) + Send + Sync>;

struct ValveState {
    current_state: bool,
    on_time: OnTime,
    /// Created on first use and kept for the lifetime of the controller.
    timer: Option<TimerHandle>,
    /// Only set while the valve is open with a non-zero on-time.
    pending: Option<Deadline>,
    observer: Option<ValveObserver>,
}

/// Inbound writes the valve understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValveUpdate {
    OnOff(bool),
    OnTime(OnTime),
}

impl ValveUpdate {
    fn classify(write: AttributeWrite) -> Result<Self, ValveError> {
        if write.cluster != ClusterId::ON_OFF {
            return Err(ValveError::UnsupportedCluster(write.cluster));
        }
        match (write.attribute, write.value) {
            (AttributeId::ON_OFF, AttributeValue::Bool(state)) => Ok(Self::OnOff(state)),
            (AttributeId::ON_TIME, AttributeValue::U16(tenths)) => {
                Ok(Self::OnTime(OnTime::from_tenths(tenths)))
            }
            _ => Err(ValveError::UnsupportedAttribute {
                cluster: write.cluster,
                attribute: write.attribute,
                value_type: write.value_type(),
            }),
        }
    }
}

/// Controller for one valve endpoint.
///
/// Built behind an [`Arc`] so the turn-off timer can reach it through a weak
/// reference: a controller that has been dropped simply ignores late expiries.
pub struct ValveController<S, T> {
    descriptor: EndpointDescriptor,
    store: S,
    timers: T,
    state: Mutex<ValveState>,
    this: Weak<Self>,
}

impl<S, T> ValveController<S, T>
where
    S: AttributeStore + 'static,
    T: TimerService + 'static,
{
    /// Create a closed valve on `endpoint` with the given default on-time.
    pub fn new(endpoint: EndpointId, on_time: OnTime, store: S, timers: T) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            descriptor: EndpointDescriptor::on_off_valve(endpoint, on_time),
            store,
            timers,
            state: Mutex::new(ValveState {
                current_state: false,
                on_time,
                timer: None,
                pending: None,
                observer: None,
            }),
            this: this.clone(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> EndpointId {
        self.descriptor.endpoint
    }

    /// Open or close the valve and mirror the value into the network layer.
    ///
    /// Opening an already open valve restarts the auto-off countdown with the
    /// latest on-time. The observer is only notified when the state changes.
    ///
    /// # Errors
    ///
    /// Returns [`ValveError::NetworkWriteRejected`] when the network layer
    /// refuses the value (local state is kept), or a timer error when the
    /// auto-off could not be armed.
    pub fn set_valve(&self, state: bool) -> Result<(), ValveError> {
        let mut inner = self.lock_state();
        self.command(&mut inner, state)
    }

    /// Re-run the state-change reaction for the current state, without
    /// touching the network layer. Used after start-up to resync the timer
    /// and the observer.
    ///
    /// # Errors
    ///
    /// Returns a timer error when the auto-off could not be armed.
    pub fn restore_valve(&self) -> Result<(), ValveError> {
        let mut inner = self.lock_state();
        self.react(&mut inner)
    }

    /// Register the observer, replacing any previous one.
    ///
    /// The observer runs while the controller lock is held and must not call
    /// back into the controller.
    pub fn on_value_changed<F>(&self, callback: F)
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.lock_state().observer = Some(Box::new(callback));
    }

    /// Fold an inbound attribute write into local state.
    ///
    /// # Errors
    ///
    /// Returns a timer error when the auto-off could not be armed.
    /// Unsupported writes are logged and dropped.
    pub fn on_attribute_write(&self, write: AttributeWrite) -> Result<(), ValveError> {
        let update = match ValveUpdate::classify(write) {
            Ok(update) => update,
            Err(err) => {
                tracing::warn!(endpoint = %self.endpoint(), %err, "received message ignored");
                return Ok(());
            }
        };
        tracing::debug!(endpoint = %self.endpoint(), ?update, "inbound attribute write");

        let mut inner = self.lock_state();
        match update {
            ValveUpdate::OnOff(state) => self.transition(&mut inner, state),
            ValveUpdate::OnTime(on_time) => {
                inner.on_time = on_time;
                self.react(&mut inner)
            }
        }
    }

    /// Current on/off state.
    #[must_use]
    pub fn state(&self) -> bool {
        self.lock_state().current_state
    }

    /// Current auto-off duration.
    #[must_use]
    pub fn on_time(&self) -> OnTime {
        self.lock_state().on_time
    }

    #[must_use]
    pub fn phase(&self) -> ValvePhase {
        let inner = self.lock_state();
        ValvePhase::of(inner.current_state, inner.on_time)
    }

    /// Local command path, shared by [`set_valve`](Self::set_valve) and the
    /// timer expiry.
    fn command(&self, inner: &mut ValveState, state: bool) -> Result<(), ValveError> {
        let reaction = self.transition(inner, state);
        let mirrored = self.mirror(inner.current_state);
        reaction.and(mirrored)
    }

    fn transition(&self, inner: &mut ValveState, state: bool) -> Result<(), ValveError> {
        if state != inner.current_state {
            inner.current_state = state;
            self.react(inner)
        } else if state {
            self.sync_timer(inner)
        } else {
            Ok(())
        }
    }

    fn react(&self, inner: &mut ValveState) -> Result<(), ValveError> {
        let timer = self.sync_timer(inner);
        match &inner.observer {
            Some(observer) => observer(inner.current_state),
            None => tracing::warn!(endpoint = %self.endpoint(), "no callback set for valve change"),
        }
        timer
    }

    fn sync_timer(&self, inner: &mut ValveState) -> Result<(), ValveError> {
        match TimerAction::for_state(inner.current_state, inner.on_time) {
            TimerAction::Arm(duration) => {
                // rescheduling replaces the pending deadline
                inner.pending = None;
                let deadline = match inner.timer {
                    Some(handle) => self.timers.reschedule(handle, duration).map_err(|err| {
                        self.timers.cancel(handle);
                        ValveError::TimerRescheduleFailed(Box::new(err))
                    })?,
                    None => {
                        let deadline = self
                            .timers
                            .schedule_once(duration, self.expiry_callback())
                            .map_err(|err| ValveError::TimerCreationFailed(Box::new(err)))?;
                        inner.timer = Some(deadline.handle);
                        deadline
                    }
                };
                tracing::debug!(
                    endpoint = %self.endpoint(),
                    timer = %deadline.handle,
                    on_time = %inner.on_time,
                    "turn-off timer armed"
                );
                inner.pending = Some(deadline);
            }
            TimerAction::Disarm => {
                if let Some(deadline) = inner.pending.take() {
                    self.timers.cancel(deadline.handle);
                    tracing::debug!(endpoint = %self.endpoint(), timer = %deadline.handle, "turn-off timer stopped");
                }
            }
        }
        Ok(())
    }

    fn mirror(&self, state: bool) -> Result<(), ValveError> {
        tracing::trace!(endpoint = %self.endpoint(), state, "updating on/off valve state");
        self.store
            .write_attribute(
                self.endpoint(),
                ClusterId::ON_OFF,
                AttributeId::ON_OFF,
                AttributeValue::Bool(state),
            )
            .map_err(|status| {
                tracing::error!(endpoint = %self.endpoint(), %status, "failed to set valve state");
                ValveError::NetworkWriteRejected(status)
            })
    }

    fn expiry_callback(&self) -> TimerCallback {
        let this = self.this.clone();
        Arc::new(move |deadline| {
            if let Some(controller) = this.upgrade() {
                controller.on_turn_off_timer(deadline);
            }
        })
    }

    fn on_turn_off_timer(&self, deadline: Deadline) {
        let mut inner = self.lock_state();
        if inner.pending != Some(deadline) {
            tracing::debug!(
                endpoint = %self.endpoint(),
                timer = %deadline.handle,
                generation = deadline.generation,
                "ignoring stale turn-off deadline"
            );
            return;
        }
        inner.pending = None;
        tracing::info!(endpoint = %self.endpoint(), on_time = %inner.on_time, "on-time elapsed, closing valve");
        if let Err(err) = self.command(&mut inner, false) {
            tracing::error!(endpoint = %self.endpoint(), %err, "auto-off did not complete");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ValveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S, T> Endpoint for ValveController<S, T>
where
    S: AttributeStore + 'static,
    T: TimerService + 'static,
{
    fn descriptor(&self) -> &EndpointDescriptor {
        &self.descriptor
    }

    fn on_attribute_write(&self, write: AttributeWrite) -> Result<(), ValveError> {
        Self::on_attribute_write(self, write)
    }
}
