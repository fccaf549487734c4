//! `av-sim` — the environment controller.
//!
//! # Step loop
//!
//! ```text
//! until every agent reports its mission complete:
//!   ① Clock:    fixed-width tick (fast time) or spin until dt real seconds
//!               have passed (wall clock).
//!   ② Traffic:  integrate every traffic vehicle with the tick width and the
//!               wind held from the previous tick.
//!   ③ Wind:     resolve this tick's wind from the profile.
//!   ④ Agents:   in registration order: push wind, terminate if complete,
//!               start once the start delay has passed, run one step, enforce
//!               the per-agent time limit.
//!   ⑤ Limit:    the global time limit ends every mission at once.
//!   ⑥ V2V:      transmit, merge, receive, flush (see [`exchange`]).
//! then, once: normalize every agent's logs into the common local frame.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use av_agent::WaypointAgent;
//! use av_core::SimConfig;
//! use av_sim::{AgentSpec, EnvironmentBuilder, NoopObserver};
//!
//! let mut env = EnvironmentBuilder::new(SimConfig { time_limit: Some(60.0), ..Default::default() })
//!     .build()?;
//! env.add_agent(Box::new(WaypointAgent::new(id, "AX1", home)), AgentSpec::default())?;
//! env.run(&mut NoopObserver)?;
//! env.write_logs("log".as_ref())?;
//! ```

pub mod builder;
pub mod env;
pub mod error;
pub mod exchange;
pub mod normalize;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::EnvironmentBuilder;
pub use env::{AgentSpec, Environment};
pub use error::{SimError, SimResult};
pub use exchange::{broadcast_eligible, ALTERNATE_BUS_APP};
pub use normalize::{normalize_logs, LocalLogs};
pub use observer::{NoopObserver, SimObserver, TickStats, VehicleKind, VehicleSnapshot};
