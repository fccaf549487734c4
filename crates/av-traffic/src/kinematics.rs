//! Traffic kinematic models.

use av_core::{LocalFrame, Lla, Ned, NoiseFilter, SimRng, Uncertainty, Wind, Xyz};

use crate::TrafficResult;

/// The kinematic model behind a traffic vehicle.
pub trait TrafficKinematics {
    /// Command a track (degrees clockwise from north), ground speed and
    /// climb rate.
    fn input_command(&mut self, heading_deg: f64, speed_mps: f64, climb_rate_mps: f64);

    /// Integrate one tick of width `dt` in `wind`.
    fn run(&mut self, dt: f64, wind: Wind);

    /// Reported position.
    fn position_lla(&self) -> Lla;

    /// Reported velocity.
    fn velocity_ned(&self) -> Ned;

    fn set_pos_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()>;

    fn set_vel_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()>;
}

/// Flies a constant commanded velocity, drifted by the wind.
#[derive(Clone, Debug)]
pub struct ConstantCommandModel {
    frame:     LocalFrame,
    /// True position, local frame.
    pos:       Xyz,
    /// Commanded velocity relative to the air mass.
    air_vel:   Xyz,
    /// Ground velocity over the last tick.
    ground_vel: Xyz,
    pos_noise: Option<NoiseFilter>,
    vel_noise: Option<NoiseFilter>,
    pos_error: Xyz,
    vel_error: Xyz,
    rng:       SimRng,
}

impl ConstantCommandModel {
    /// A model at `pos` (local frame of `home`) moving with `vel`.
    pub fn new(home: Lla, pos: Xyz, vel: Xyz, rng: SimRng) -> Self {
        Self {
            frame: LocalFrame::new(home),
            pos,
            air_vel: vel,
            ground_vel: vel,
            pos_noise: None,
            vel_noise: None,
            pos_error: Xyz::default(),
            vel_error: Xyz::default(),
            rng,
        }
    }

    /// True (noise-free) position in the local frame.
    pub fn local_position(&self) -> Xyz {
        self.pos
    }

    fn filter(&mut self, uncertainty: Uncertainty, stream: u64) -> TrafficResult<Option<NoiseFilter>> {
        if uncertainty.is_zero() {
            return Ok(None);
        }
        Ok(Some(NoiseFilter::new(uncertainty, self.rng.child(stream))?))
    }
}

impl TrafficKinematics for ConstantCommandModel {
    fn input_command(&mut self, heading_deg: f64, speed_mps: f64, climb_rate_mps: f64) {
        self.air_vel = Xyz::from_ned(Ned::from_track(heading_deg, speed_mps, climb_rate_mps));
    }

    fn run(&mut self, dt: f64, wind: Wind) {
        let (east, north) = wind.drift_en();
        self.ground_vel = self.air_vel + Xyz::new(east, north, 0.0);
        self.pos = self.pos + self.ground_vel * dt;
        if let Some(f) = self.pos_noise.as_mut() {
            let [x, y, z] = f.sample();
            self.pos_error = Xyz::new(x, y, z);
        }
        if let Some(f) = self.vel_noise.as_mut() {
            let [x, y, z] = f.sample();
            self.vel_error = Xyz::new(x, y, z);
        }
    }

    fn position_lla(&self) -> Lla {
        self.frame.to_lla(self.pos + self.pos_error)
    }

    fn velocity_ned(&self) -> Ned {
        (self.ground_vel + self.vel_error).to_ned()
    }

    fn set_pos_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.pos_noise = self.filter(uncertainty, 1)?;
        self.pos_error = Xyz::default();
        Ok(())
    }

    fn set_vel_uncertainty(&mut self, uncertainty: Uncertainty) -> TrafficResult<()> {
        self.vel_noise = self.filter(uncertainty, 2)?;
        self.vel_error = Xyz::default();
        Ok(())
    }
}
