//! A traffic vehicle: kinematic model plus V2V transmitter.

use av_comms::{Datagram, EndpointKind, Transmitter};
use av_core::{Lla, Ned, Uncertainty, VehicleId, Wind};

use crate::{TrafficKinematics, TrafficResult};

pub struct TrafficVehicle {
    pub id:       VehicleId,
    /// `tf<id>`.
    pub callsign: String,
    model:        Box<dyn TrafficKinematics>,
    transmitter:  Box<dyn Transmitter>,
}

impl TrafficVehicle {
    pub fn new(id: VehicleId, model: Box<dyn TrafficKinematics>, transmitter: Box<dyn Transmitter>) -> Self {
        Self {
            id,
            callsign: format!("tf{}", id.0),
            model,
            transmitter,
        }
    }

    pub fn step(&mut self, dt: f64, wind: Wind) {
        self.model.run(dt, wind);
    }

    pub fn position(&self) -> Lla {
        self.model.position_lla()
    }

    pub fn velocity(&self) -> Ned {
        self.model.velocity_ned()
    }

    pub fn transmitter_kind(&self) -> EndpointKind {
        self.transmitter.kind()
    }

    /// Broadcast this vehicle's reported state as an intruder datagram.
    pub fn transmit(&mut self, time: f64) {
        let pos = self.position();
        let datagram = Datagram::intruder(self.callsign.clone(), pos, self.velocity());
        self.transmitter.transmit(time, pos, datagram);
    }

    pub fn set_pos_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.model.set_pos_uncertainty(uncertainty)
    }

    pub fn set_vel_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.model.set_vel_uncertainty(uncertainty)
    }
}
