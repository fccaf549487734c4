//! `av-agent` — cooperative agents as seen by the environment controller.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`agent`]    | `Agent` trait: the capability set the controller drives        |
//! | [`state`]    | `AgentCore`: identity, live state, mission state, logs         |
//! | [`mission`]  | `MissionState` and its monotone transitions                     |
//! | [`plan`]     | `Waypoint`, `LocalWaypoint`, `Geofence`, merge-fix CSV loader   |
//! | [`track`]    | `TrackLog`: rate-limited position/velocity history             |
//! | [`flightlog`]| `FlightLog`: the JSON document written at the end of a run     |
//! | [`waypoint`] | `WaypointAgent`: a minimal plan-following reference agent      |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                  |
//!
//! # Design notes
//!
//! Autopilot and mission logic are not part of this crate.  An implementor
//! embeds an [`AgentCore`] and overrides the hooks it cares about; every
//! hook except [`Agent::run`] has a default that works on the core alone.
//! The controller only ever reads and writes agents through the trait.

pub mod agent;
pub mod error;
pub mod flightlog;
pub mod mission;
pub mod plan;
pub mod state;
pub mod track;
pub mod waypoint;


pub use agent::Agent;
pub use state::{AgentCore, DEFAULT_LOG_RATE_HZ};
pub use error::{AgentError, AgentResult};
pub use flightlog::{write_flight_log, FlightLog, LocalGeofence};
pub use track::TrackLog;
pub use mission::MissionState;
pub use plan::{load_merge_fixes, load_merge_fixes_reader, FenceKind, FlightPlan, Geofence, LocalWaypoint, Waypoint};
pub use waypoint::WaypointAgent;
