//! Plain data rows written by output backends.

use av_agent::MissionState;
use av_core::{Lla, Ned, SimClock};
use av_sim::{TickStats, VehicleSnapshot};

/// One vehicle's reported state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleStateRow {
    pub tick:       u64,
    pub time:       f64,
    pub vehicle_id: u32,
    pub callsign:   String,
    /// `agent` or `traffic`.
    pub kind:       &'static str,
    pub position:   Lla,
    pub velocity:   Ned,
    /// Empty for traffic.
    pub mission:    &'static str,
}

impl VehicleStateRow {
    pub fn from_snapshot(clock: &SimClock, v: &VehicleSnapshot) -> Self {
        Self {
            tick:       clock.count,
            time:       clock.current_time,
            vehicle_id: v.id.0,
            callsign:   v.callsign.clone(),
            kind:       v.kind.as_str(),
            position:   v.position,
            velocity:   v.velocity,
            mission:    v.mission.map_or("", MissionState::as_str),
        }
    }
}

/// Counters for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:        u64,
    pub time:        f64,
    pub dt:          f64,
    pub running:     u64,
    pub complete:    u64,
    pub transmitted: u64,
    pub delivered:   u64,
    pub lost:        u64,
}

impl TickSummaryRow {
    pub fn from_stats(clock: &SimClock, stats: &TickStats) -> Self {
        Self {
            tick:        clock.count,
            time:        clock.current_time,
            dt:          stats.dt,
            running:     stats.running as u64,
            complete:    stats.complete as u64,
            transmitted: stats.channel.transmitted as u64,
            delivered:   stats.channel.delivered as u64,
            lost:        stats.channel.lost as u64,
        }
    }
}
