//! Live window bounds resolution

use std::sync::Arc;

use crate::{
    error::{CaptureError, CaptureResult},
    model::{ResolvedWindow, WindowHandle},
};

use super::WindowRegionSource;

/// Turns a [`WindowHandle`] into its authoritative on-screen rectangle.
///
/// Always asks the injected [`WindowRegionSource`]; the handle's cached
/// rectangle is only used for diagnostics.
#[derive(Clone)]
pub struct WindowRegionResolver {
    source: Arc<dyn WindowRegionSource>,
}

impl WindowRegionResolver {
    pub fn new(source: Arc<dyn WindowRegionSource>) -> Self {
        Self { source }
    }

    /// Re-reads the window's live bounds.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::WindowUnavailable`] if the window is gone or reports
    ///   a non-positive width or height
    /// - Whatever the source itself returns for OS query failures
    #[tracing::instrument(skip(self, handle), fields(window = %handle.title, id = %handle.id))]
    pub fn resolve(&self, handle: &WindowHandle) -> CaptureResult<ResolvedWindow> {
        let Some(resolved) = self.source.refresh(handle)? else {
            tracing::warn!("Window disappeared before capture");
            return Err(CaptureError::WindowUnavailable {
                window: handle.title.clone(),
                reason: "window no longer exists".to_string(),
            });
        };

        if !resolved.rect.has_area() {
            tracing::warn!(
                width = resolved.rect.width,
                height = resolved.rect.height,
                "Window reports no area"
            );
            return Err(CaptureError::WindowUnavailable {
                window: handle.title.clone(),
                reason: format!(
                    "window reports a {}x{} rectangle",
                    resolved.rect.width, resolved.rect.height
                ),
            });
        }

        if resolved.rect != handle.rect {
            tracing::debug!(
                cached = ?handle.rect,
                live = ?resolved.rect,
                "Window moved since selection"
            );
        }

        Ok(resolved)
    }
}

impl std::fmt::Debug for WindowRegionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowRegionResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{capture::mock::MockWindowSource, model::ScreenRect};

    fn handle() -> WindowHandle {
        WindowHandle::new("7", "Editor", ScreenRect::new(0, 0, 300, 200))
    }

    #[test]
    fn test_resolve_returns_live_rect() {
        let source = Arc::new(MockWindowSource::new());
        source.add_window(handle(), true);
        source.move_window("7", ScreenRect::new(40, 60, 320, 240));

        let resolver = WindowRegionResolver::new(source.clone());
        let resolved = resolver.resolve(&handle()).unwrap();

        assert_eq!(resolved.rect, ScreenRect::new(40, 60, 320, 240));
        assert!(resolved.visible);
        assert_eq!(source.refresh_count(), 1);
    }

    #[test]
    fn test_resolve_closed_window() {
        let source = Arc::new(MockWindowSource::new());
        source.add_window(handle(), true);
        source.close_window("7");

        let resolver = WindowRegionResolver::new(source);
        let err = resolver.resolve(&handle()).unwrap_err();
        assert!(matches!(err, CaptureError::WindowUnavailable { .. }));
    }

    #[test]
    fn test_resolve_rejects_degenerate_rect() {
        for rect in [ScreenRect::new(0, 0, 0, 100), ScreenRect::new(0, 0, 100, -4)] {
            let source = Arc::new(MockWindowSource::new());
            source.add_window(handle(), true);
            source.move_window("7", rect);

            let resolver = WindowRegionResolver::new(source);
            assert!(matches!(
                resolver.resolve(&handle()),
                Err(CaptureError::WindowUnavailable { .. })
            ));
        }
    }

    #[test]
    fn test_resolve_reports_hidden_window() {
        let source = Arc::new(MockWindowSource::new());
        source.add_window(handle(), false);

        let resolver = WindowRegionResolver::new(source);
        assert!(!resolver.resolve(&handle()).unwrap().visible);
    }
}
