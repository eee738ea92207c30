//! Error types for block rendering.

/// Error surfaced by [`BlockRenderer::render`](crate::BlockRenderer::render).
///
/// Blocks that cannot be highlighted are rendered through the plain fallback
/// and never produce an error. Only failures to write output reach the caller.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output sink or the style sheet sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generating the style sheet for a theme failed.
    #[error("Failed to generate style sheet: {0}")]
    Stylesheet(#[from] syntect::Error),
}
