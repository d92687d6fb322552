use thiserror::Error;

/// Every failure the engine reports to its callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or inconsistent load input. Fatal to that load call only.
    #[error("data integrity error in {source_name}: {message}")]
    DataIntegrity {
        source_name: String,
        message: String,
    },

    /// An OD pair whose destination cannot be reached.
    #[error("no path from {origin} to {destination}")]
    NoPath { origin: String, destination: String },

    /// Negative flow/capacity or an out-of-range parameter.
    #[error("invalid input for {context}: {message}")]
    InvalidInput { context: String, message: String },

    #[error("unsupported intervention type '{0}'")]
    UnsupportedIntervention(String),

    #[error("invalid intervention target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("unknown intervention id {0}")]
    UnknownIntervention(u64),

    #[error("intervention {requested} cannot be rolled back while {latest} is still applied")]
    RollbackOrder { requested: u64, latest: u64 },

    #[error("unknown scenario handle {0}")]
    UnknownScenario(u64),

    /// Another writer currently holds the scenario.
    #[error("scenario {0} is busy with another mutation")]
    ScenarioBusy(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn data_integrity(source_name: &str, message: impl Into<String>) -> Self {
        EngineError::DataIntegrity {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_input(context: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
