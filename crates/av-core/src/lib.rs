//! `av-core` — foundational types for the airspace V2V simulator.
//!
//! This crate is a dependency of every other `av-*` crate.  It has no `av-*`
//! dependencies and few external ones (`rand`, `rand_distr`, `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `IntersectionId`                             |
//! | [`geo`]         | `Lla`, `Ned`, `Xyz`, `LocalFrame`                         |
//! | [`time`]        | `SimClock`, `ClockMode`, `SimConfig`                      |
//! | [`wind`]        | `Wind`, `WindProfile`                                     |
//! | [`rng`]         | `SimRng` (seeded, reproducible)                           |
//! | [`uncertainty`] | `Uncertainty`, `NoiseFilter` (smoothed Gaussian noise)    |
//! | [`error`]       | `AvError`, `AvResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required for scenario loading and JSON flight logs.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;
pub mod uncertainty;
pub mod wind;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AvError, AvResult};
pub use geo::{LocalFrame, Lla, Ned, Xyz};
pub use ids::{IntersectionId, VehicleId};
pub use rng::SimRng;
pub use time::{ClockMode, SimClock, SimConfig};
pub use uncertainty::{NoiseFilter, Uncertainty};
pub use wind::{Wind, WindProfile};
