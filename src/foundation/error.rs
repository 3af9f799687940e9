/// Convenience result type used across the crate.
pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(thiserror::Error, Debug)]
/// Top-level error type for geometry tracking and overlay synchronization.
pub enum OverlayError {
    /// Input scene or document failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The host could not answer a measurement or style query.
    #[error("host error: {0}")]
    Host(String),

    /// Scene (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error propagated from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OverlayError {
    /// Build an [`OverlayError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`OverlayError::Host`] value.
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Build an [`OverlayError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
