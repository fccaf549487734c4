//! Rate-limited position/velocity history.

use av_core::{Lla, Ned, Xyz};
use serde::{Deserialize, Serialize};

/// Parallel per-sample arrays for one vehicle's track.
///
/// All four vectors always have the same length.  `position_local` is filled
/// in by the agent while flying and rewritten by the coordinate normalizer
/// once the run ends.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackLog {
    pub time:           Vec<f64>,
    pub position:       Vec<Lla>,
    #[serde(rename = "velocityNED")]
    pub velocity_ned:   Vec<Ned>,
    #[serde(rename = "positionNED")]
    pub position_local: Vec<Xyz>,
}

impl TrackLog {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    /// Append a sample unless the previous one is less than `min_interval`
    /// seconds old.  Returns `true` when the sample was kept.
    pub fn record(&mut self, time: f64, min_interval: f64, position: Lla, velocity: Ned, local: Xyz) -> bool {
        if let Some(last) = self.last_time() {
            if time - last < min_interval {
                return false;
            }
        }
        self.time.push(time);
        self.position.push(position);
        self.velocity_ned.push(velocity);
        self.position_local.push(local);
        true
    }
}
