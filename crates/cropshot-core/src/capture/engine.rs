//! Capture engine holding optional capture capabilities
//!
//! The engine owns the fallback policy. Backends only report what happened;
//! the engine decides what to try next:
//!
//! 1. Native render with [`RenderMode::FullContent`]
//! 2. Native render with [`RenderMode::Minimal`] if (1) was rejected
//! 3. Region grab if the native path is missing or rejected both modes,
//!    unless the window is hidden (the grab would show whatever covers it)
//!
//! Resource failures from the native path are terminal and never masked by
//! the region grab.

use std::{sync::Arc, time::Instant};

use super::{
    CapturedImage, NativeWindowCapture, RegionCapture, RenderMode, RenderOutcome, constants,
};
use crate::{
    error::{CaptureError, CaptureFailure, CaptureResult},
    model::{BackendType, ResolvedWindow, WindowHandle},
};

/// Capture capabilities resolved once at construction.
pub struct CaptureEngine {
    /// Window-handle based rendering (GDI `PrintWindow` on Windows).
    pub native: Option<Arc<dyn NativeWindowCapture>>,

    /// Desktop rectangle grab.
    pub region: Option<Arc<dyn RegionCapture>>,

    /// Engine name for diagnostics.
    pub name: &'static str,
}

impl CaptureEngine {
    pub fn new(
        native: Option<Arc<dyn NativeWindowCapture>>,
        region: Option<Arc<dyn RegionCapture>>,
        name: &'static str,
    ) -> Self {
        Self {
            native,
            region,
            name,
        }
    }

    /// An engine with no capabilities; every capture fails with `NoBackend`.
    pub fn unavailable() -> Self {
        Self::new(None, None, "none")
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    pub fn has_region_fallback(&self) -> bool {
        self.region.is_some()
    }

    /// Captures the window at its resolved rectangle.
    ///
    /// # Errors
    ///
    /// [`CaptureError::CaptureFailed`] with:
    /// - `NoBackend` when the engine has no capability at all
    /// - `ResourceAcquisition` from the native path, immediately
    /// - `WindowInvisible` when the native path could not render a hidden
    ///   window
    /// - `RenderRejected` when both render modes were declined and no
    ///   region grab is wired
    /// - `RegionGrabFailed` when the fallback failed
    #[tracing::instrument(
        skip(self, handle, resolved),
        fields(engine = self.name, window = %handle.title)
    )]
    pub fn capture(
        &self,
        handle: &WindowHandle,
        resolved: &ResolvedWindow,
    ) -> CaptureResult<CapturedImage> {
        if self.native.is_none() && self.region.is_none() {
            tracing::error!("No capture backend configured");
            return Err(CaptureError::capture_failed(
                CaptureFailure::NoBackend,
                format!("engine '{}' has no capture capability", self.name),
            ));
        }

        let start = Instant::now();
        let rect = resolved.rect;
        let mut native_rejected = false;

        if let (Some(native), Some(id)) = (&self.native, handle.native) {
            for mode in [RenderMode::FullContent, RenderMode::Minimal] {
                match native.render(id, rect, mode)? {
                    RenderOutcome::Rendered(image) => {
                        tracing::info!(
                            duration_ms = start.elapsed().as_millis() as u64,
                            width = image.width(),
                            height = image.height(),
                            path = "native",
                            ?mode,
                            "Window captured"
                        );
                        return Ok(image);
                    }
                    RenderOutcome::Rejected => {
                        tracing::warn!(?mode, flags = mode.flags(), "PrintWindow rejected");
                    }
                }
            }
            native_rejected = true;
        } else if self.native.is_some() {
            tracing::debug!("Handle has no native id, skipping native path");
        }

        if !resolved.visible {
            tracing::error!(native_rejected, "Window is hidden and could not be rendered");
            return Err(CaptureError::capture_failed(
                CaptureFailure::WindowInvisible,
                format!("'{}' is minimized or hidden", handle.title),
            ));
        }

        let Some(region) = &self.region else {
            tracing::error!("Native rendering rejected and no region fallback is wired");
            return Err(CaptureError::capture_failed(
                CaptureFailure::RenderRejected,
                format!(
                    "'{}' declined PrintWindow with flags {} and 0",
                    handle.title,
                    constants::PW_RENDERFULLCONTENT
                ),
            ));
        };

        tracing::warn!(?rect, "Falling back to screen region grab");

        let image = region.grab(rect).map_err(|e| match e {
            CaptureError::CaptureFailed { .. } => e,
            other => CaptureError::capture_failed(CaptureFailure::RegionGrabFailed, other.to_string()),
        })?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            width = image.width(),
            height = image.height(),
            path = "region",
            "Window captured"
        );

        Ok(image)
    }
}

impl std::fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("name", &self.name)
            .field("has_native", &self.native.is_some())
            .field("has_region", &self.region.is_some())
            .finish()
    }
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates the engine for a given display backend.
///
/// - Windows: GDI native path, plus the xcap region grab when
///   `region_fallback` is set
/// - X11, Wayland, macOS: xcap region grab only
/// - None: an engine that reports `NoBackend`
pub fn create_engine(backend: BackendType, region_fallback: bool) -> CaptureEngine {
    match backend {
        BackendType::Windows => create_windows_engine(region_fallback),
        BackendType::X11 | BackendType::Wayland | BackendType::MacOS => {
            CaptureEngine::new(None, Some(Arc::new(super::XcapRegionGrab::new())), "xcap")
        }
        BackendType::None => CaptureEngine::unavailable(),
    }
}

#[cfg(target_os = "windows")]
fn create_windows_engine(region_fallback: bool) -> CaptureEngine {
    let region: Option<Arc<dyn RegionCapture>> = if region_fallback {
        Some(Arc::new(super::XcapRegionGrab::new()))
    } else {
        None
    };

    CaptureEngine::new(Some(Arc::new(super::GdiWindowCapture::new())), region, "gdi")
}

#[cfg(not(target_os = "windows"))]
fn create_windows_engine(_region_fallback: bool) -> CaptureEngine {
    tracing::warn!("Windows backend requested on a non-Windows build");
    CaptureEngine::unavailable()
}

/// Creates the engine for the detected platform, honoring
/// `CROPSHOT_REGION_FALLBACK`.
pub fn create_default_engine() -> CaptureEngine {
    let platform = crate::util::detect::detect_platform();
    tracing::debug!(os = %platform.os, backend = %platform.backend, "Creating capture engine");
    create_engine(platform.backend, constants::region_fallback_enabled())
}
