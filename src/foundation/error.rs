/// Convenience result type used across skinsmith.
pub type SkinResult<T> = Result<T, SkinError>;

/// Top-level error taxonomy used by build, stage and post-process APIs.
#[derive(thiserror::Error, Debug)]
pub enum SkinError {
    /// Invalid or missing configuration: strategy options, unknown strategy, missing stage.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid geometry, pixel buffers or other caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A build stage failed; carries the stage name for diagnosis.
    #[error("stage `{stage}` failed: {message}")]
    Stage {
        /// Stage name as reported in stage events.
        stage: String,
        /// Underlying failure message.
        message: String,
    },

    /// Errors while rasterising, decoding or encoding images.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkinError {
    /// Build a [`SkinError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`SkinError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SkinError::Stage`] value.
    pub fn stage(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: msg.into(),
        }
    }

    /// Build a [`SkinError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SkinError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for configuration errors, which are raised before any work starts.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
