/// Convenience result type used across textstamp.
pub type StampResult<T> = Result<T, StampError>;

/// Top-level error taxonomy used by library APIs.
#[derive(thiserror::Error, Debug)]
pub enum StampError {
    /// Invalid user-provided form data. The message names the offending field.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Rasterization or encoding failure.
    #[error("render error: {0}")]
    Render(String),

    /// An export run is already in flight and the entry policy rejects re-triggers.
    #[error("an export run is already in progress")]
    ExportBusy,

    /// The export run was superseded or cancelled before it finished.
    #[error("export run was cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StampError {
    /// Build a [`StampError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StampError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StampError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a validation error that names an invalid form field.
    pub fn invalid_field(field: &str, value: &str) -> Self {
        Self::Validation(format!("field '{field}' has invalid value \"{value}\""))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
