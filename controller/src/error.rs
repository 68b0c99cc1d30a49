//! Error taxonomy (spec §7): config errors are detected before the first
//! iteration, metric errors are captured in-band per evaluation, and
//! load-generator errors are fatal to the current session.

pub use shared::{ConfigError, LoadGeneratorError};

/// A metric could not be computed or fetched. Surfaces on the affected
/// `MetricEvaluation` only; never aborts the iteration (§4.2, §7).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MetricError(pub String);

impl MetricError {
    pub fn unimplemented(message: impl Into<String>) -> Self {
        Self(format!("Unimplemented: {}", message.into()))
    }
}

/// Session-level error, the union of everything that can abort a session
/// before `SessionOutput` is produced.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    LoadGenerator(#[from] LoadGeneratorError),
}
