//! Mission state machine.
//!
//! ```text
//! NotStarted ──start──▶ Running ──complete──▶ Complete
//!      │                   │
//!      └──────force────────┴───────force──────▶ Terminated
//! ```
//!
//! Transitions only move right.  `Complete` and `Terminated` are terminal:
//! further transition requests are ignored.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MissionState {
    #[default]
    NotStarted,
    Running,
    /// The agent finished its own mission.
    Complete,
    /// The controller ended the mission (time limit).
    Terminated,
}

impl MissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            MissionState::NotStarted => "not_started",
            MissionState::Running    => "running",
            MissionState::Complete   => "complete",
            MissionState::Terminated => "terminated",
        }
    }

    /// `true` once the mission can no longer run.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, MissionState::Complete | MissionState::Terminated)
    }

    /// `NotStarted → Running`.  Returns `true` when the state changed.
    pub fn start(&mut self) -> bool {
        if *self == MissionState::NotStarted {
            *self = MissionState::Running;
            true
        } else {
            false
        }
    }

    /// `Running → Complete`.  Returns `true` when the state changed.
    pub fn complete(&mut self) -> bool {
        if *self == MissionState::Running {
            *self = MissionState::Complete;
            true
        } else {
            false
        }
    }

    /// Any non-terminal state `→ Terminated`.  Returns `true` when the state
    /// changed.
    pub fn force_end(&mut self) -> bool {
        if self.is_terminal() {
            false
        } else {
            *self = MissionState::Terminated;
            true
        }
    }
}
