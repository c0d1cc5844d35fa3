//! Error types for the fallible edges of the crate
//!
//! The numeric engine itself is total. Only loading records from disk and
//! resolving scenario trees can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid table {table}: {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("Scenario {0} is defined more than once")]
    DuplicateScenario(String),

    #[error("Scenario {scenario} references unknown parent {parent}")]
    UnknownParent { scenario: String, parent: String },

    #[error("Scenario chain through {0} forms a cycle")]
    CycleDetected(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid scenario {scenario}: {reason}")]
    InvalidScenario { scenario: String, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
