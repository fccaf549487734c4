use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommsError {
    #[error("unknown propagation model `{0}` (expected NoLoss, FreeSpace or TwoRayGround)")]
    UnknownPropagation(String),

    #[error("unknown reception model `{0}` (expected Perfect, Deterministic, Rayleigh or Nakagami)")]
    UnknownReception(String),

    #[error("unknown endpoint kind `{0}` (expected ADS-B, GroundTruth or none)")]
    UnknownEndpoint(String),

    #[error("invalid {model} parameter: {reason}")]
    InvalidParameter {
        model:  &'static str,
        reason: String,
    },
}

pub type CommsResult<T> = Result<T, CommsError>;
