use thiserror::Error;

/// Failure surfaced by a [`crate::Renderer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The rendering surface was replaced or detached between calls (the
    /// underlying list container re-mounted). Recoverable once via
    /// re-acquisition.
    #[error("render target went stale")]
    StaleTarget,
    /// Generic transient render failure; the round is retried with
    /// unchanged state.
    #[error("render failure: {0}")]
    Failure(String),
}
