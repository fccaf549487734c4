//! V2V wire datagrams.

use av_core::{IntersectionId, Lla, Ned, VehicleId};
use serde::{Deserialize, Serialize};

/// Capacity bound on arrival records carried by one merger datagram.
pub const MAX_NODES: usize = 5;

/// A vehicle's role in the distributed merge-sequencing protocol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeRole {
    #[default]
    Neutral,
    Follower,
    Candidate,
    Leader,
}

/// One vehicle's requested slot at a shared intersection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub vehicle_id:      VehicleId,
    pub intersection_id: IntersectionId,
    /// Requested time of arrival at the intersection, seconds.
    pub requested_time:  f64,
    pub role:            NodeRole,
}

/// Self-reported ownship state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntruderReport {
    pub callsign: String,
    pub pos:      Lla,
    pub vel:      Ned,
}

/// Snapshot of every known arrival record for one intersection.
///
/// `log.len() <= MAX_NODES` and `total_nodes == log.len()`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeLog {
    pub intersection_id: IntersectionId,
    pub node_role:       NodeRole,
    pub total_nodes:     usize,
    pub log:             Vec<ArrivalRecord>,
}

/// A V2V broadcast payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Datagram {
    Intruder(IntruderReport),
    Merger(MergeLog),
}

impl Datagram {
    pub fn intruder(callsign: impl Into<String>, pos: Lla, vel: Ned) -> Self {
        Datagram::Intruder(IntruderReport { callsign: callsign.into(), pos, vel })
    }

    /// Wire type tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Datagram::Intruder(_) => "INTRUDER",
            Datagram::Merger(_)   => "MERGER",
        }
    }
}
