//! Simulation observer trait for progress reporting and data collection.

use av_agent::MissionState;
use av_comms::ChannelStats;
use av_core::{Lla, Ned, SimClock, VehicleId};

/// Counters for one completed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Effective width of the tick, seconds.
    pub dt:       f64,
    /// Agents whose mission is running at the end of the tick.
    pub running:  usize,
    /// Agents whose mission is complete or terminated.
    pub complete: usize,
    pub channel:  ChannelStats,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleKind {
    Agent,
    Traffic,
}

impl VehicleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleKind::Agent   => "agent",
            VehicleKind::Traffic => "traffic",
        }
    }
}

/// Reported state of one vehicle at a snapshot tick.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleSnapshot {
    pub id:       VehicleId,
    pub callsign: String,
    pub kind:     VehicleKind,
    pub position: Lla,
    pub velocity: Ned,
    /// `None` for traffic, which has no mission.
    pub mission:  Option<MissionState>,
}

/// Callbacks invoked by [`Environment::run`][crate::Environment::run] at key
/// points in the step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called once the clock has advanced, before any vehicle moves.
    fn on_tick_start(&mut self, _clock: &SimClock) {}

    /// Called after the tick's V2V exchange.
    fn on_tick_end(&mut self, _clock: &SimClock, _stats: &TickStats) {}

    /// Called every `config.output_interval_ticks` ticks with the state of
    /// every agent followed by every traffic vehicle.
    fn on_snapshot(&mut self, _clock: &SimClock, _vehicles: &[VehicleSnapshot]) {}

    /// Called once after the final tick, after log normalization.
    fn on_sim_end(&mut self, _clock: &SimClock) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
