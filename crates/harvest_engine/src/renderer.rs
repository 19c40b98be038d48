use crate::RenderError;

/// One exclusive, stateful interactive rendering surface.
///
/// The harvest loop only ever talks to this trait, so the core algorithm can
/// run against a scripted fake that replays canned snapshots. Live
/// implementations own their settle delays: `reveal_more` and `open` return
/// only after the jittered wait that gives asynchronous content time to
/// materialize.
#[async_trait::async_trait]
pub trait Renderer: Send {
    /// Idempotent trigger that causes the host page to attempt to render
    /// additional items. May be a no-op if the list is already exhausted.
    async fn reveal_more(&mut self) -> Result<(), RenderError>;

    /// Snapshot of everything currently materialized, as serialized markup.
    async fn current_content(&mut self) -> Result<String, RenderError>;

    /// Loads one item's own page and returns its snapshot.
    async fn open(&mut self, url: &str) -> Result<String, RenderError>;

    /// Attempts to re-locate the render surface after a
    /// [`RenderError::StaleTarget`].
    async fn reacquire(&mut self) -> Result<(), RenderError>;
}
