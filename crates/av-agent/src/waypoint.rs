//! `WaypointAgent`: flies its first flight plan at constant ground speed.
//!
//! No autopilot, no conflict avoidance.  Used by the demo and as a test
//! double for the controller.

use av_comms::{ArrivalRecord, MergeLog, NodeRole};
use av_core::{IntersectionId, LocalFrame, Lla, VehicleId, Xyz};

use crate::{Agent, AgentCore, AgentError, AgentResult, FlightPlan, Geofence};

/// Ground speed used when none is configured, m/s.
const DEFAULT_SPEED_MPS: f64 = 10.0;

pub struct WaypointAgent {
    core:       AgentCore,
    speed_mps:  f64,
    /// Index of the waypoint currently being flown to.
    next:       usize,
    reached_end: bool,
}

impl WaypointAgent {
    pub fn new(id: VehicleId, callsign: impl Into<String>, home: Lla) -> Self {
        Self {
            core: AgentCore::new(id, callsign, home),
            speed_mps: DEFAULT_SPEED_MPS,
            next: 0,
            reached_end: false,
        }
    }

    pub fn with_plan(mut self, plan: FlightPlan) -> Self {
        self.core.plans.push(plan);
        self
    }

    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = speed_mps;
        self
    }

    pub fn with_fence(mut self, fence: Geofence) -> Self {
        self.core.fences.push(fence);
        self
    }

    /// Request a slot at `intersection` for `requested_time`.
    pub fn with_arrival(mut self, intersection: IntersectionId, requested_time: f64) -> Self {
        self.core.arrival = Some(ArrivalRecord {
            vehicle_id: self.core.id,
            intersection_id: intersection,
            requested_time,
            role: NodeRole::Neutral,
        });
        self
    }

    /// Index of the waypoint being flown to, `None` once the plan is done.
    pub fn next_waypoint(&self) -> Option<usize> {
        (!self.reached_end).then_some(self.next)
    }

    fn fly(&mut self, dt: f64) -> AgentResult<()> {
        let Some(plan) = self.core.plans.first() else {
            self.reached_end = true;
            return Ok(());
        };
        if !(self.speed_mps.is_finite() && self.speed_mps > 0.0) {
            return Err(AgentError::Fault {
                callsign: self.core.callsign.clone(),
                reason:   format!("ground speed must be positive, got {}", self.speed_mps),
            });
        }

        let frame = LocalFrame::new(self.core.home);
        let start = frame.to_local(self.core.position);
        let mut pos = start;
        let mut budget = self.speed_mps * dt;

        while let Some(wp) = plan.get(self.next) {
            let target = frame.to_local(wp.position);
            let (dx, dy, dz) = (target.x - pos.x, target.y - pos.y, target.z - pos.z);
            let dist = (dx * dx + dy * dy + dz * dz).sqrt();
            if dist <= budget {
                pos = target;
                budget -= dist;
                self.next += 1;
            } else {
                let k = budget / dist;
                pos = pos + Xyz { x: dx, y: dy, z: dz } * k;
                break;
            }
        }
        if self.next >= plan.len() {
            self.reached_end = true;
        }

        let step = Xyz { x: pos.x - start.x, y: pos.y - start.y, z: pos.z - start.z };
        self.core.velocity = if dt > 0.0 { (step * (1.0 / dt)).to_ned() } else { Default::default() };
        self.core.position = frame.to_lla(pos);
        Ok(())
    }
}

impl Agent for WaypointAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    fn check_mission_complete(&mut self) -> bool {
        if self.reached_end {
            self.core.complete_mission();
        }
        self.core.is_complete()
    }

    fn run(&mut self, time: f64, dt: f64) -> AgentResult<bool> {
        if !self.core.is_started() || self.core.is_complete() || self.reached_end {
            return Ok(false);
        }
        self.fly(dt)?;
        self.core.record_ownship(time);
        Ok(true)
    }

    /// Take the leader role when this agent's requested time is the earliest
    /// in the log, follower otherwise.
    fn input_merge_log(&mut self, log: MergeLog) {
        if let Some(own) = self.core.arrival.as_mut() {
            let earliest = log
                .log
                .iter()
                .min_by(|a, b| a.requested_time.total_cmp(&b.requested_time))
                .map(|r| r.vehicle_id);
            own.role = if earliest == Some(own.vehicle_id) {
                NodeRole::Leader
            } else {
                NodeRole::Follower
            };
        }
        self.core.merge_log = Some(log);
    }
}
