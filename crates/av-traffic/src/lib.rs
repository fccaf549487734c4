//! `av-traffic` — non-cooperative traffic vehicles.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`kinematics`]| `TrafficKinematics` trait, `ConstantCommandModel`                |
//! | [`vehicle`]   | `TrafficVehicle`: a kinematic model plus its transmitter        |
//! | [`generator`] | `TrafficSpec`, `TrafficGenerator`: polar placement, per-tick step |
//! | [`error`]     | `TrafficError`, `TrafficResult<T>`                               |
//!
//! # Movement model
//!
//! Traffic has no mission logic.  Each vehicle holds a commanded heading,
//! ground speed and climb rate and integrates its position in the local frame
//! anchored at its home, adding the wind drift for the tick.  Reported state
//! can be perturbed with smoothed correlated noise (see
//! [`av_core::NoiseFilter`]).

pub mod error;
pub mod generator;
pub mod kinematics;
pub mod vehicle;


pub use error::{TrafficError, TrafficResult};
pub use generator::{TrafficGenerator, TrafficSpec};
pub use kinematics::{ConstantCommandModel, TrafficKinematics};
pub use vehicle::TrafficVehicle;
