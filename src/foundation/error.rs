/// Convenience result type used across flipbook.
pub type FlipbookResult<T> = Result<T, FlipbookError>;

/// Top-level error taxonomy used by the raster core and the studio.
#[derive(thiserror::Error, Debug)]
pub enum FlipbookError {
    /// A pixel coordinate fell outside the buffer it addresses.
    #[error("out of bounds: ({x}, {y}) not inside {width}x{height}")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// Buffer width.
        width: u32,
        /// Buffer height.
        height: u32,
    },

    /// Malformed or unsupported encoded image bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// The image or animation encoder rejected its input.
    #[error("encode error: {0}")]
    Encode(String),

    /// Broken data-model invariant (stroke/pressure mismatch, empty frame, ...).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Invalid user-provided parameters or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing project documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlipbookError {
    /// Build a [`FlipbookError::OutOfBounds`] value.
    pub fn out_of_bounds(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a [`FlipbookError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FlipbookError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FlipbookError::InvariantViolation`] value.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Build a [`FlipbookError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FlipbookError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error is an [`FlipbookError::OutOfBounds`].
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
