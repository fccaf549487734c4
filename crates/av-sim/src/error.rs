use av_agent::AgentError;
use av_comms::CommsError;
use av_core::{AvError, VehicleId};
use av_traffic::TrafficError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("no agents registered")]
    NoAgents,

    #[error("vehicle id {0} is already registered")]
    DuplicateId(VehicleId),

    /// An agent's step failed.  The run stops at the tick it happened.
    #[error("agent {callsign} failed at t={time:.3}s: {source}")]
    AgentFault {
        callsign: String,
        time:     f64,
        #[source]
        source:   AgentError,
    },

    #[error(transparent)]
    Core(#[from] AvError),

    #[error(transparent)]
    Comms(#[from] CommsError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Traffic(#[from] TrafficError),
}

pub type SimResult<T> = Result<T, SimError>;
