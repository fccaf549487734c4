//! `AgentCore`: the state every cooperative agent carries.

use std::collections::{BTreeMap, BTreeSet};

use av_comms::{ArrivalRecord, MergeLog};
use av_core::{LocalFrame, Lla, Ned, VehicleId, Wind, Xyz};
use log::info;

use crate::{FlightPlan, Geofence, LocalWaypoint, MissionState, TrackLog};

/// Default sampling rate of ownship and traffic logs.
pub const DEFAULT_LOG_RATE_HZ: f64 = 5.0;

/// Identity, live state, mission state and logs of one agent.
///
/// Fields are public so agent implementations can update them directly from
/// their own step logic; mission transitions go through the methods so the
/// state machine stays monotone.
#[derive(Clone, Debug)]
pub struct AgentCore {
    // ── Identity ──────────────────────────────────────────────────────────
    pub id:       VehicleId,
    pub callsign: String,
    /// Origin of the agent's own local frame.  Replaced by the run's global
    /// home when logs are normalized.
    pub home:     Lla,

    // ── Live state ────────────────────────────────────────────────────────
    pub position: Lla,
    pub velocity: Ned,
    /// Names of active internal subsystems.
    pub apps:     BTreeSet<String>,
    /// This agent's requested slot at a shared intersection, if any.
    pub arrival:  Option<ArrivalRecord>,
    /// Latest wind pushed by the controller.
    pub wind:     Wind,
    /// Latest merge log accepted for this agent's intersection.
    pub merge_log: Option<MergeLog>,

    mission:    MissionState,
    started_at: Option<f64>,
    shut_down:  bool,

    // ── Plans and airspace ────────────────────────────────────────────────
    pub plans:       Vec<FlightPlan>,
    pub fences:      Vec<Geofence>,
    pub merge_fixes: Vec<Lla>,

    // ── Logs ──────────────────────────────────────────────────────────────
    pub ownship_log: TrackLog,
    /// Per-callsign history of received traffic.
    pub traffic_log: BTreeMap<String, TrackLog>,
    min_log_interval: f64,

    // ── Normalized output ─────────────────────────────────────────────────
    pub local_plans:       Vec<Vec<LocalWaypoint>>,
    pub local_fences:      Vec<Vec<Xyz>>,
    pub local_merge_fixes: Vec<Xyz>,
}

impl AgentCore {
    pub fn new(id: VehicleId, callsign: impl Into<String>, home: Lla) -> Self {
        Self {
            id,
            callsign: callsign.into(),
            home,
            position: home,
            velocity: Ned::default(),
            apps: BTreeSet::new(),
            arrival: None,
            wind: Wind::CALM,
            merge_log: None,
            mission: MissionState::NotStarted,
            started_at: None,
            shut_down: false,
            plans: Vec::new(),
            fences: Vec::new(),
            merge_fixes: Vec::new(),
            ownship_log: TrackLog::default(),
            traffic_log: BTreeMap::new(),
            min_log_interval: min_interval(DEFAULT_LOG_RATE_HZ),
            local_plans: Vec::new(),
            local_fences: Vec::new(),
            local_merge_fixes: Vec::new(),
        }
    }

    /// Change the ownship/traffic log sampling rate.  Non-positive rates log
    /// every sample.
    pub fn set_log_rate(&mut self, hz: f64) {
        self.min_log_interval = if hz > 0.0 { min_interval(hz) } else { 0.0 };
    }

    // ── Mission state ─────────────────────────────────────────────────────

    pub fn mission(&self) -> MissionState {
        self.mission
    }

    /// `true` once the mission has been started.  Never reverts.
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// `true` once the mission is complete or terminated.  Never reverts.
    pub fn is_complete(&self) -> bool {
        self.mission.is_terminal()
    }

    /// Time the mission was started, if it has been.
    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    /// Start the mission at `time`.  Ignored unless the mission has not
    /// started yet.
    pub fn start_mission(&mut self, time: f64) -> bool {
        if !self.mission.start() {
            return false;
        }
        self.started_at = Some(time);
        info!("{}: mission started at {time:.2}s", self.callsign);
        true
    }

    /// Mark the agent's own mission as finished.
    pub fn complete_mission(&mut self) -> bool {
        self.mission.complete()
    }

    /// End the mission from outside (time limits).  Idempotent.
    pub fn force_complete(&mut self) -> bool {
        self.mission.force_end()
    }

    /// Release the agent's resources.  Returns `true` the first time only.
    pub fn shut_down(&mut self) -> bool {
        !std::mem::replace(&mut self.shut_down, true)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    // ── Logging ───────────────────────────────────────────────────────────

    /// Local coordinates of `p` in this agent's own frame.
    pub fn local(&self, p: Lla) -> Xyz {
        LocalFrame::new(self.home).to_local(p)
    }

    /// Sample the ownship state into the ownship log.  Samples at the null
    /// position (no state yet) are skipped.
    pub fn record_ownship(&mut self, time: f64) -> bool {
        if self.position.is_null() {
            return false;
        }
        let local = self.local(self.position);
        self.ownship_log.record(time, self.min_log_interval, self.position, self.velocity, local)
    }

    /// Sample a traffic report into the per-callsign traffic log.
    pub fn record_traffic(&mut self, time: f64, callsign: &str, position: Lla, velocity: Ned) -> bool {
        let local = self.local(position);
        let interval = self.min_log_interval;
        self.traffic_log
            .entry(callsign.to_owned())
            .or_default()
            .record(time, interval, position, velocity, local)
    }
}

#[inline]
fn min_interval(hz: f64) -> f64 {
    1.0 / hz - 0.01
}
