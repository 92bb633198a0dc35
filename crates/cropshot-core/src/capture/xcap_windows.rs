//! Window enumeration and live bounds via xcap
//!
//! xcap has no lookup by id, so [`WindowRegionSource::refresh`] enumerates
//! all windows and picks the one whose id matches. On Windows the xcap id is
//! the `HWND` value, which is also exposed as the handle's native id so the
//! GDI path can use it.

use xcap::Window;

use super::{WindowEnumerator, WindowRegionSource};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{ResolvedWindow, ScreenRect, WindowHandle},
};

/// [`WindowEnumerator`] and [`WindowRegionSource`] over `xcap::Window`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapWindows;

impl XcapWindows {
    pub fn new() -> Self {
        Self
    }

    fn all_windows() -> CaptureResult<Vec<Window>> {
        Window::all().map_err(|e| {
            tracing::error!("Failed to enumerate xcap windows: {}", e);
            CaptureError::EnumerationFailed {
                reason: e.to_string(),
            }
        })
    }

    fn window_rect(window: &Window) -> Option<ScreenRect> {
        let x = window.x().ok()?;
        let y = window.y().ok()?;
        let width = i32::try_from(window.width().ok()?).ok()?;
        let height = i32::try_from(window.height().ok()?).ok()?;
        Some(ScreenRect::new(x, y, width, height))
    }

    fn to_handle(window: &Window) -> Option<WindowHandle> {
        let id = window.id().ok()?;
        let title = window.title().ok()?;
        let rect = Self::window_rect(window)?;

        let handle = WindowHandle::new(id.to_string(), title, rect);

        #[cfg(target_os = "windows")]
        let handle = handle.with_native(id as crate::model::NativeWindowId);

        Some(handle)
    }
}

impl WindowEnumerator for XcapWindows {
    #[tracing::instrument(skip(self))]
    fn list_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        let windows = Self::all_windows()?;
        let total = windows.len();

        let handles: Vec<WindowHandle> = windows
            .iter()
            .filter(|w| !w.is_minimized().unwrap_or(false))
            .filter_map(Self::to_handle)
            .filter(|h| !h.title.trim().is_empty() && h.rect.has_area())
            .collect();

        tracing::debug!(total, listed = handles.len(), "Enumerated windows");
        Ok(handles)
    }
}

impl WindowRegionSource for XcapWindows {
    #[tracing::instrument(skip(self, handle), fields(id = %handle.id))]
    fn refresh(&self, handle: &WindowHandle) -> CaptureResult<Option<ResolvedWindow>> {
        let Ok(wanted) = handle.id.parse::<u32>() else {
            tracing::warn!("Handle id is not an xcap window id");
            return Ok(None);
        };

        let windows = Self::all_windows()?;
        let Some(window) = windows.iter().find(|w| w.id().ok() == Some(wanted)) else {
            return Ok(None);
        };

        let Some(rect) = Self::window_rect(window) else {
            return Ok(None);
        };

        let visible = !window.is_minimized().unwrap_or(false);
        tracing::debug!(?rect, visible, "Refreshed window bounds");

        Ok(Some(ResolvedWindow { rect, visible }))
    }
}
