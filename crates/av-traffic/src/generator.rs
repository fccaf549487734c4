//! Traffic creation from polar placement, and the per-tick traffic step.

use av_comms::{transmitter_from_name, ChannelHandle};
use av_core::{Lla, Ned, SimRng, Uncertainty, VehicleId, Wind, Xyz};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{ConstantCommandModel, TrafficError, TrafficKinematics, TrafficResult, TrafficVehicle};

/// Placement and command of one traffic vehicle, relative to a home point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficSpec {
    pub id:             VehicleId,
    /// Horizontal distance from home, metres.
    pub range_m:        f64,
    /// Bearing from home, degrees clockwise from north.
    pub bearing_deg:    f64,
    /// Altitude above home, metres.
    pub altitude_m:     f64,
    pub speed_mps:      f64,
    /// Track, degrees clockwise from north.
    pub heading_deg:    f64,
    #[serde(default)]
    pub climb_rate_mps: f64,
    #[serde(default = "default_transmitter")]
    pub transmitter:    String,
}

fn default_transmitter() -> String {
    "GroundTruth".to_owned()
}

impl TrafficSpec {
    /// Initial position in the local frame of home.
    pub fn offset(&self) -> Xyz {
        Xyz::from_polar(self.range_m, self.bearing_deg, self.altitude_m)
    }

    /// Initial velocity in the local frame.
    pub fn velocity(&self) -> Xyz {
        Xyz::from_ned(Ned::from_track(self.heading_deg, self.speed_mps, self.climb_rate_mps))
    }
}

/// Owns every traffic vehicle of a run.
pub struct TrafficGenerator {
    vehicles: Vec<TrafficVehicle>,
    rng:      SimRng,
}

impl TrafficGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            vehicles: Vec::new(),
            rng: SimRng::for_stream(seed, 1),
        }
    }

    /// Create a constant-command traffic vehicle and bind its transmitter to
    /// `channel`.
    pub fn create_traffic(&mut self, spec: &TrafficSpec, home: Lla, channel: &ChannelHandle) -> TrafficResult<&TrafficVehicle> {
        if self.vehicles.iter().any(|v| v.id == spec.id) {
            return Err(TrafficError::DuplicateId(spec.id));
        }
        let transmitter = transmitter_from_name(&spec.transmitter, spec.id, channel)?;
        let mut model = ConstantCommandModel::new(home, spec.offset(), spec.velocity(), self.rng.child(spec.id.0 as u64));
        model.input_command(spec.heading_deg, spec.speed_mps, spec.climb_rate_mps);

        let vehicle = TrafficVehicle::new(spec.id, Box::new(model), transmitter);
        info!(
            "{}: range {:.0} m bearing {:.0}° alt {:.0} m, transmitter {}",
            vehicle.callsign,
            spec.range_m,
            spec.bearing_deg,
            spec.altitude_m,
            vehicle.transmitter_kind()
        );
        self.vehicles.push(vehicle);
        Ok(&self.vehicles[self.vehicles.len() - 1])
    }

    /// Add an already-built vehicle.
    pub fn push(&mut self, vehicle: TrafficVehicle) -> TrafficResult<()> {
        if self.vehicles.iter().any(|v| v.id == vehicle.id) {
            return Err(TrafficError::DuplicateId(vehicle.id));
        }
        self.vehicles.push(vehicle);
        Ok(())
    }

    /// Advance every vehicle by `dt` in `wind`.
    pub fn step(&mut self, dt: f64, wind: Wind) {
        for v in &mut self.vehicles {
            v.step(dt, wind);
        }
    }

    /// Every vehicle broadcasts its reported state.
    pub fn transmit(&mut self, time: f64) {
        for v in &mut self.vehicles {
            v.transmit(time);
        }
    }

    pub fn set_pos_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.vehicles.iter_mut().try_for_each(|v| v.set_pos_uncertainty(uncertainty))
    }

    pub fn set_vel_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.vehicles.iter_mut().try_for_each(|v| v.set_vel_uncertainty(uncertainty))
    }

    pub fn vehicles(&self) -> &[TrafficVehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}
