use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemandError {
    #[error("Cumulative probability {probability} is out of range for distribution [{distribution}]")]
    OutOfRange {
        probability: f64,
        distribution: String,
    },

    #[error("Distribution '{what}' has no entry with non-zero probability")]
    EmptyDistribution { what: String },

    #[error("Distribution '{what}' is invalid: {reason}")]
    InvalidDistribution { what: String, reason: String },

    #[error("Demand stream '{key}' has no request left to generate")]
    StreamExhausted { key: String },

    #[error("Demand stream '{key}' not found")]
    StreamNotFound { key: String },

    #[error("Demand stream '{key}' already exists")]
    DuplicateStream { key: String },

    #[error("Invalid demand configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DemandResult<T> = Result<T, DemandError>;
