/// Convenience result type used across panostitch.
pub type StitchResult<T> = Result<T, StitchError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only "cannot start" conditions surface here. Per-pixel anomalies (an absent face, a UV that
/// needed clamping) are absorbed by the engine and counted in [`RunStats`](crate::RunStats).
#[derive(thiserror::Error, Debug)]
pub enum StitchError {
    /// Fewer source images were supplied than the configured variant requires.
    #[error(
        "insufficient input: {supplied}/{required} required source images supplied (missing: {})",
        missing.join(", ")
    )]
    InsufficientInput {
        /// Number of images the run needs before it may start.
        required: usize,
        /// Number of required images actually present.
        supplied: usize,
        /// Labels of the absent required slots.
        missing: Vec<String>,
    },

    /// Invalid configuration or source data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StitchError {
    /// Build a [`StitchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StitchError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`StitchError::InsufficientInput`] value.
    pub fn insufficient_input(required: usize, supplied: usize, missing: Vec<String>) -> Self {
        Self::InsufficientInput {
            required,
            supplied,
            missing,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
