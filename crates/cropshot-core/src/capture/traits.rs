//! Composable capability traits for window capture
//!
//! Each trait is one capability an OS layer may or may not provide. The
//! [`CaptureEngine`](super::CaptureEngine) holds them as optional trait
//! objects and decides the fallback order itself, so backends stay small.
//!
//! - [`WindowEnumerator`]: list capturable windows
//! - [`WindowRegionSource`]: re-read a window's live bounds and visibility
//! - [`NativeWindowCapture`]: render a window by native handle (GDI)
//! - [`RegionCapture`]: grab a rectangle of the desktop
//!
//! All methods are blocking. Callers that run an async runtime move them to
//! a blocking worker.

use crate::{
    error::CaptureResult,
    model::{NativeWindowId, ResolvedWindow, ScreenRect, WindowHandle},
};

use super::CapturedImage;

/// Capability: list the windows a user can pick from.
pub trait WindowEnumerator: Send + Sync {
    /// Visible, titled windows with their current rectangles.
    fn list_windows(&self) -> CaptureResult<Vec<WindowHandle>>;
}

/// Capability: re-query live OS state for a previously selected window.
pub trait WindowRegionSource: Send + Sync {
    /// Returns the live rectangle and visibility, or `None` when the window
    /// no longer exists.
    ///
    /// Implementations must not fall back to `handle.rect`; that value is
    /// stale by definition.
    fn refresh(&self, handle: &WindowHandle) -> CaptureResult<Option<ResolvedWindow>>;
}

/// How hard the compositor is asked to render a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Include DirectComposition / hardware-accelerated content
    FullContent,
    /// Plain `PrintWindow` with no flags
    Minimal,
}

impl RenderMode {
    /// `PrintWindow` flag value for this mode.
    pub fn flags(&self) -> u32 {
        match self {
            RenderMode::FullContent => super::constants::PW_RENDERFULLCONTENT,
            RenderMode::Minimal => 0,
        }
    }
}

/// Result of a single native render attempt that did not hit a resource
/// failure.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(CapturedImage),
    /// The window declined to render (zero return from the OS)
    Rejected,
}

/// Capability: render a window into an offscreen bitmap by native handle.
///
/// Resource failures (device context, bitmap, readback) are returned as
/// `Err(CaptureFailed { reason: ResourceAcquisition, .. })` and are terminal.
/// A render the OS merely declined is `Ok(RenderOutcome::Rejected)`.
pub trait NativeWindowCapture: Send + Sync {
    fn render(
        &self,
        native: NativeWindowId,
        rect: ScreenRect,
        mode: RenderMode,
    ) -> CaptureResult<RenderOutcome>;
}

/// Capability: copy a rectangle of the visible desktop.
///
/// Whatever overlaps the rectangle on screen is captured too.
pub trait RegionCapture: Send + Sync {
    /// Returns an image with exactly `rect`'s pixel size.
    fn grab(&self, rect: ScreenRect) -> CaptureResult<CapturedImage>;
}
