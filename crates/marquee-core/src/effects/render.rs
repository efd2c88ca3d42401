//! Render target interface.

use async_trait::async_trait;

use crate::display::DisplayContent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Template failed: {reason}")]
    Template { reason: String },
    #[error("Render target unavailable: {reason}")]
    TargetUnavailable { reason: String },
}

/// Turns resolved content into markup on the single render target.
///
/// `render` must resolve once the new content is mounted and must accept
/// the empty state. Implementations are expected to be idempotent; the
/// coordinator may render the same content twice when `forced` is set.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, content: &DisplayContent, forced: bool) -> Result<(), RenderError>;
}

#[async_trait]
impl<T: Renderer + ?Sized> Renderer for std::sync::Arc<T> {
    async fn render(&self, content: &DisplayContent, forced: bool) -> Result<(), RenderError> {
        (**self).render(content, forced).await
    }
}
