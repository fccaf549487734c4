//! JSON flight logs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use av_core::{Lla, Xyz};
use log::info;
use serde::{Deserialize, Serialize};

use crate::plan::FenceKind;
use crate::{AgentCore, AgentResult, FlightPlan, Geofence, LocalWaypoint, MissionState, TrackLog};

/// A geofence with its vertices in the run's local frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalGeofence {
    pub id:       u32,
    pub kind:     FenceKind,
    pub floor:    f64,
    pub roof:     f64,
    pub vertices: Vec<Xyz>,
}

/// Everything written to `simlog-<callsign>.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightLog {
    pub callsign:          String,
    pub mission:           MissionState,
    pub state:             TrackLog,
    pub traffic:           BTreeMap<String, TrackLog>,
    pub origin:            Lla,
    pub flightplans:       Vec<FlightPlan>,
    pub flightplans_local: Vec<Vec<LocalWaypoint>>,
    pub geofences:         Vec<Geofence>,
    pub geofences_local:   Vec<LocalGeofence>,
    pub mergefixes_local:  Vec<Xyz>,
}

impl FlightLog {
    pub fn from_core(core: &AgentCore) -> Self {
        let geofences_local = core
            .fences
            .iter()
            .zip(&core.local_fences)
            .map(|(fence, vertices)| LocalGeofence {
                id:       fence.id,
                kind:     fence.kind,
                floor:    fence.floor,
                roof:     fence.roof,
                vertices: vertices.clone(),
            })
            .collect();

        Self {
            callsign:          core.callsign.clone(),
            mission:           core.mission(),
            state:             core.ownship_log.clone(),
            traffic:           core.traffic_log.clone(),
            origin:            core.home,
            flightplans:       core.plans.clone(),
            flightplans_local: core.local_plans.clone(),
            geofences:         core.fences.clone(),
            geofences_local,
            mergefixes_local:  core.local_merge_fixes.clone(),
        }
    }
}

/// Write `core`'s flight log to `<dir>/simlog-<callsign>.json`, creating
/// `dir` if needed.  Returns the path written.
pub fn write_flight_log(core: &AgentCore, dir: &Path) -> AgentResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("simlog-{}.json", core.callsign));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, &FlightLog::from_core(core))?;
    writer.flush()?;
    info!("{}: wrote {}", core.callsign, path.display());
    Ok(path)
}
