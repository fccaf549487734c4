use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An agent's step failed.  Fatal to the whole run.
    #[error("agent {callsign} faulted: {reason}")]
    Fault { callsign: String, reason: String },
}

pub type AgentResult<T> = Result<T, AgentError>;
