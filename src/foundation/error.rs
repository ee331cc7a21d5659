/// Convenience result type used across mudcanvas.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// A widget id did not resolve to a registered surface.
    #[error("unknown widget '{0}'")]
    UnknownWidget(String),

    /// Color text matched none of the accepted grammars.
    #[error("invalid color format: {0}")]
    InvalidColorFormat(String),

    /// An image could not be fetched or decoded.
    #[error("image load error for '{url}': {reason}")]
    ImageLoad {
        /// URL exactly as requested.
        url: String,
        /// Human readable cause.
        reason: String,
    },

    /// A source rectangle reaches outside the image it samples from.
    #[error("source rect {src} lies outside image '{url}' ({width}x{height})")]
    SourceOutOfBounds {
        /// URL of the sampled image.
        url: String,
        /// Offending source rectangle, formatted.
        src: String,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A polygon was given fewer than three points.
    #[error("polygon needs at least 3 points, got {0}")]
    InsufficientPoints(usize),

    /// `begin_batch` was called on a widget that is already batching.
    #[error("widget '{0}' is already batching")]
    AlreadyBatching(String),

    /// `end_batch` was called on a widget that is not batching.
    #[error("widget '{0}' is not batching")]
    NotBatching(String),

    /// Malformed arguments or data that has no safe fallback.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::UnknownWidget`] value.
    pub fn unknown_widget(id: impl Into<String>) -> Self {
        Self::UnknownWidget(id.into())
    }

    /// Build a [`CanvasError::InvalidColorFormat`] value.
    pub fn invalid_color(text: impl Into<String>) -> Self {
        Self::InvalidColorFormat(text.into())
    }

    /// Build a [`CanvasError::ImageLoad`] value.
    pub fn image_load(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImageLoad {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`CanvasError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
