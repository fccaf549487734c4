use av_comms::CommsError;
use av_core::{AvError, VehicleId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrafficError {
    #[error("traffic {0} already exists")]
    DuplicateId(VehicleId),

    #[error(transparent)]
    Core(#[from] AvError),

    #[error(transparent)]
    Comms(#[from] CommsError),
}

pub type TrafficResult<T> = Result<T, TrafficError>;
