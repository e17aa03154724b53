/// Convenience result type used across the engine.
pub type CoordResult<T> = Result<T, CoordError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CoordError {
    /// Composing or connecting mappings/frames with incompatible axis counts.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Inverse requested where some component lacks an inverse.
    #[error("inverse undefined: {0}")]
    InverseUndefined(String),

    /// A frame-set index does not name a live node, or names one that
    /// cannot be removed.
    #[error("invalid frame index: {0}")]
    InvalidIndex(String),

    /// A leaf transform's numeric evaluation failed for the given input.
    #[error("transform evaluation error: {0}")]
    Evaluation(String),

    /// Invalid constructor or mutation arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoordError {
    /// Build a [`CoordError::DimensionMismatch`] value.
    pub fn dimension_mismatch(msg: impl Into<String>) -> Self {
        Self::DimensionMismatch(msg.into())
    }

    /// Build a [`CoordError::InverseUndefined`] value.
    pub fn inverse_undefined(msg: impl Into<String>) -> Self {
        Self::InverseUndefined(msg.into())
    }

    /// Build a [`CoordError::InvalidIndex`] value.
    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndex(msg.into())
    }

    /// Build a [`CoordError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`CoordError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
