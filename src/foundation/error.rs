/// Convenience result type used across dpframe.
pub type DpResult<T> = Result<T, DpError>;

/// Top-level error taxonomy used by compositor APIs.
#[derive(thiserror::Error, Debug)]
pub enum DpError {
    /// An argument is outside the domain of the operation (non-finite geometry, unknown tag).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid frame definition or session data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Uploaded file is not an image.
    #[error("invalid file type: {0}")]
    InvalidFileType(String),

    /// Uploaded file exceeds the configured byte limit.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Size of the rejected upload.
        size: u64,
        /// Active limit.
        limit: u64,
    },

    /// An action needs an input the user has not provided yet.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Errors while compiling or executing a render plan.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DpError {
    /// Build a [`DpError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`DpError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DpError::InvalidFileType`] value.
    pub fn invalid_file_type(msg: impl Into<String>) -> Self {
        Self::InvalidFileType(msg.into())
    }

    /// Build a [`DpError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`DpError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error is a recoverable user-input problem that should surface as a notice.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::InvalidFileType(_) | Self::FileTooLarge { .. } | Self::MissingRequiredField(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
