use thiserror::Error;

/// Construction-time failures for assumption and decision records.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("assumption {id}: min {min} must not exceed max {max}")]
    InvalidRange { id: String, min: f64, max: f64 },

    #[error("assumption {id}: step must be > 0, got {step}")]
    NonPositiveStep { id: String, step: f64 },

    #[error("non-finite numeric value in {field}")]
    NonFinite { field: String },

    #[error("assumption {id}: value {value} is outside [{min}, {max}]")]
    ValueOutOfRange {
        id: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown assumption id: {0}")]
    UnknownAssumption(String),

    #[error("decision id must not be empty")]
    EmptyDecisionId,

    #[error("decision {id}: end age {end_age} is before start age {start_age}")]
    InvalidDecisionWindow {
        id: String,
        start_age: u32,
        end_age: u32,
    },

    #[error("decision {id}: {reason}")]
    InvalidDecisionImpact { id: String, reason: &'static str },
}
