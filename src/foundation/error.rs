/// Convenience result type used across Chartcast.
pub type ChartcastResult<T> = Result<T, ChartcastError>;

/// Top-level error taxonomy used by recording APIs.
///
/// Estimation failures are deliberately absent: duration estimation recovers
/// locally with a documented fallback and never surfaces an error.
#[derive(thiserror::Error, Debug)]
pub enum ChartcastError {
    /// Invalid user-provided data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// The capture target is not attached to a live surface.
    #[error("capture target is not attached")]
    CaptureTargetMissing,

    /// The platform cannot provide a video encoder for this session.
    #[error("encoder unavailable: {0}")]
    EncoderUnavailable(String),

    /// A recording is already in progress; stop or cancel it first.
    #[error("a recording session is already active")]
    AlreadyRecording,

    /// Errors while driving the encoder or finalizing the artifact.
    #[error("encoding error: {0}")]
    Encode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChartcastError {
    /// Build a [`ChartcastError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ChartcastError::EncoderUnavailable`] value.
    pub fn encoder_unavailable(msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable(msg.into())
    }

    /// Build a [`ChartcastError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
