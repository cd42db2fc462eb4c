//! Valve state machine primitives.
//!
//! The valve is either closed (`Off`) or open. An open valve with a non-zero
//! [`OnTime`] closes itself once that duration has elapsed; with an on-time of
//! zero it stays open until told otherwise.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Auto-off duration in tenths of a second. Zero disables the auto-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnTime(u16);

impl OnTime {
    /// Six minutes.
    pub const DEFAULT: Self = Self(3600);
    pub const DISABLED: Self = Self(0);

    #[must_use]
    pub const fn from_tenths(tenths: u16) -> Self {
        Self(tenths)
    }

    #[must_use]
    pub const fn tenths(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }

    /// Convert to a [`Duration`]. `u16::MAX` tenths is under two hours, so
    /// the conversion cannot overflow.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.0) * 100)
    }
}

impl Default for OnTime {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u16> for OnTime {
    fn from(tenths: u16) -> Self {
        Self(tenths)
    }
}

impl fmt::Display for OnTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}s", self.0 / 10, self.0 % 10)
    }
}

/// Observable phase of the valve, derived from its state and on-time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValvePhase {
    Off,
    OnNoTimeout,
    OnTimed,
}

impl ValvePhase {
    #[must_use]
    pub const fn of(state: bool, on_time: OnTime) -> Self {
        match (state, on_time.is_disabled()) {
            (false, _) => Self::Off,
            (true, true) => Self::OnNoTimeout,
            (true, false) => Self::OnTimed,
        }
    }
}

impl fmt::Display for ValvePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::OnNoTimeout => f.write_str("on"),
            Self::OnTimed => f.write_str("on (timed)"),
        }
    }
}

/// What must happen to the turn-off timer after the valve state was touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Arm the timer, replacing any pending deadline.
    Arm(Duration),
    /// Make sure no deadline is pending.
    Disarm,
}

impl TimerAction {
    #[must_use]
    pub fn for_state(state: bool, on_time: OnTime) -> Self {
        match ValvePhase::of(state, on_time) {
            ValvePhase::OnTimed => Self::Arm(on_time.as_duration()),
            ValvePhase::Off | ValvePhase::OnNoTimeout => Self::Disarm,
        }
    }
}
