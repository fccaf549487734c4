//! Flight plans, airspace boundaries and merge fixes.

use std::io::Read;
use std::path::Path;

use av_core::{Lla, Xyz};
use serde::{Deserialize, Serialize};

use crate::AgentResult;

// ── Flight plans ──────────────────────────────────────────────────────────────

/// One flight-plan waypoint in geodetic coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Scheduled time at the waypoint, seconds.
    pub time:      f64,
    pub position:  Lla,
    /// Trajectory-change-point kinds (horizontal, speed, vertical).
    #[serde(default)]
    pub tcp:       [i32; 3],
    /// Values attached to each trajectory-change point.
    #[serde(default)]
    pub tcp_value: [f64; 3],
}

impl Waypoint {
    pub fn new(time: f64, position: Lla) -> Self {
        Self { time, position, tcp: [0; 3], tcp_value: [0.0; 3] }
    }

    /// The same waypoint with its position replaced by a local coordinate.
    /// Time and trajectory-change fields carry through untouched.
    pub fn localize(&self, position: Xyz) -> LocalWaypoint {
        LocalWaypoint {
            time: self.time,
            position,
            tcp: self.tcp,
            tcp_value: self.tcp_value,
        }
    }
}

/// A waypoint after projection into the run's common local frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalWaypoint {
    pub time:      f64,
    pub position:  Xyz,
    pub tcp:       [i32; 3],
    pub tcp_value: [f64; 3],
}

pub type FlightPlan = Vec<Waypoint>;

// ── Geofences ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceKind {
    KeepIn,
    KeepOut,
}

/// A vertical prism of airspace described by its boundary polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    pub id:       u32,
    pub kind:     FenceKind,
    /// Lower altitude bound, metres.
    pub floor:    f64,
    /// Upper altitude bound, metres.
    pub roof:     f64,
    pub vertices: Vec<Lla>,
}

// ── Merge fixes ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MergeFixRecord {
    lat: f64,
    lon: f64,
    alt: f64,
}

/// Load merge fixes from a CSV file with a `lat,lon,alt` header.
pub fn load_merge_fixes(path: &Path) -> AgentResult<Vec<Lla>> {
    let file = std::fs::File::open(path)?;
    load_merge_fixes_reader(file)
}

/// Like [`load_merge_fixes`] but accepts any `Read` source.
pub fn load_merge_fixes_reader<R: Read>(reader: R) -> AgentResult<Vec<Lla>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut fixes = Vec::new();
    for row in csv_reader.deserialize::<MergeFixRecord>() {
        let row = row?;
        fixes.push(Lla::new(row.lat, row.lon, row.alt));
    }
    Ok(fixes)
}
