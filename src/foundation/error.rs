/// Convenience result type used across vizplay.
pub type VizResult<T> = Result<T, VizError>;

/// Top-level error taxonomy used by player APIs.
///
/// Errors only escape at the boundaries (spec loading, surface allocation, sinks). Problems
/// inside a frame are absorbed by the renderer and logged instead.
#[derive(thiserror::Error, Debug)]
pub enum VizError {
    /// Invalid user-provided spec or options.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while resolving animation tracks.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while allocating or writing drawing surfaces.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizError {
    /// Build a [`VizError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VizError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`VizError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`VizError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
