//! Mock capture collaborators for testing
//!
//! Scriptable stand-ins for every capability trait, so the resolver, engine
//! and session can be exercised without a windowing system.
//!
//! - [`MockWindowSource`]: an in-memory window table implementing both
//!   [`WindowEnumerator`] and [`WindowRegionSource`]; windows can be moved,
//!   hidden or closed between calls
//! - [`MockNativeCapture`]: replays a queue of [`MockRender`] outcomes and
//!   records which [`RenderMode`] each call used
//! - [`MockRegionGrab`]: returns a test pattern of the requested size, or a
//!   scripted failure
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use cropshot_core::{
//!     capture::{
//!         CaptureEngine, RenderMode,
//!         mock::{MockNativeCapture, MockRegionGrab, MockRender},
//!     },
//!     model::{ResolvedWindow, ScreenRect, WindowHandle},
//! };
//!
//! let native = Arc::new(MockNativeCapture::new().script([MockRender::Reject, MockRender::Reject]));
//! let region = Arc::new(MockRegionGrab::new());
//! let engine = CaptureEngine::new(Some(native.clone()), Some(region.clone()), "mock");
//!
//! let rect = ScreenRect::new(0, 0, 64, 48);
//! let handle = WindowHandle::new("1", "Mock", rect).with_native(1);
//! let image = engine
//!     .capture(&handle, &ResolvedWindow { rect, visible: true })
//!     .unwrap();
//!
//! assert_eq!(image.dimensions(), (64, 48));
//! assert_eq!(native.modes(), vec![RenderMode::FullContent, RenderMode::Minimal]);
//! assert_eq!(region.grab_count(), 1);
//! ```

use std::{
    collections::VecDeque,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};

use super::{
    CapturedImage, NativeWindowCapture, RegionCapture, RenderMode, RenderOutcome,
    WindowEnumerator, WindowRegionSource,
};
use crate::{
    error::{CaptureError, CaptureFailure, CaptureResult},
    model::{NativeWindowId, ResolvedWindow, ScreenRect, WindowHandle},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
struct MockWindow {
    handle:  WindowHandle,
    rect:    ScreenRect,
    visible: bool,
    closed:  bool,
}

/// In-memory window table.
#[derive(Debug, Default)]
pub struct MockWindowSource {
    windows:       Mutex<Vec<MockWindow>>,
    refresh_calls: AtomicUsize,
    fail_listing:  bool,
}

impl MockWindowSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `list_windows` always fails.
    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    /// Three windows resembling a typical desktop.
    pub fn with_sample_windows() -> Self {
        let source = Self::new();
        source.add_window(
            WindowHandle::new("1001", "Untitled - Notepad", ScreenRect::new(100, 100, 800, 600))
                .with_native(1001),
            true,
        );
        source.add_window(
            WindowHandle::new(
                "1002",
                "Invoice 2024-03.pdf - Adobe Acrobat Reader",
                ScreenRect::new(0, 0, 1280, 1024),
            )
            .with_native(1002),
            true,
        );
        source.add_window(
            WindowHandle::new("1003", "Terminal", ScreenRect::new(-40, 700, 640, 360))
                .with_native(1003),
            true,
        );
        source
    }

    pub fn add_window(&self, handle: WindowHandle, visible: bool) {
        let rect = handle.rect;
        lock(&self.windows).push(MockWindow {
            handle,
            rect,
            visible,
            closed: false,
        });
    }

    /// Changes the live rectangle without touching the handle's cached one.
    pub fn move_window(&self, id: &str, rect: ScreenRect) {
        self.update(id, |w| w.rect = rect);
    }

    pub fn set_visible(&self, id: &str, visible: bool) {
        self.update(id, |w| w.visible = visible);
    }

    pub fn close_window(&self, id: &str) {
        self.update(id, |w| w.closed = true);
    }

    /// Number of `refresh` calls made so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut MockWindow)) {
        if let Some(window) = lock(&self.windows).iter_mut().find(|w| w.handle.id == id) {
            f(window);
        }
    }
}

impl WindowEnumerator for MockWindowSource {
    fn list_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        if self.fail_listing {
            return Err(CaptureError::EnumerationFailed {
                reason: "mock enumeration failure".to_string(),
            });
        }

        Ok(lock(&self.windows)
            .iter()
            .filter(|w| !w.closed && w.visible)
            .map(|w| WindowHandle {
                rect: w.rect,
                ..w.handle.clone()
            })
            .collect())
    }
}

impl WindowRegionSource for MockWindowSource {
    fn refresh(&self, handle: &WindowHandle) -> CaptureResult<Option<ResolvedWindow>> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);

        Ok(lock(&self.windows)
            .iter()
            .find(|w| w.handle.id == handle.id && !w.closed)
            .map(|w| ResolvedWindow {
                rect:    w.rect,
                visible: w.visible,
            }))
    }
}

/// One scripted native render result.
#[derive(Debug, Clone)]
pub enum MockRender {
    /// Render a test pattern of the requested size
    Pattern,
    /// Render the given image regardless of the requested size
    Image(CapturedImage),
    /// Decline to render
    Reject,
    /// Fail with `ResourceAcquisition`
    ResourceFailure,
}

/// Native capture that replays scripted outcomes in order.
///
/// Once the script runs out every call renders a test pattern.
#[derive(Debug, Default)]
pub struct MockNativeCapture {
    script: Mutex<VecDeque<MockRender>>,
    modes:  Mutex<Vec<RenderMode>>,
}

impl MockNativeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, outcomes: impl IntoIterator<Item = MockRender>) -> Self {
        lock(&self.script).extend(outcomes);
        self
    }

    /// Modes requested so far, in call order.
    pub fn modes(&self) -> Vec<RenderMode> {
        lock(&self.modes).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.modes).len()
    }
}

impl NativeWindowCapture for MockNativeCapture {
    fn render(
        &self,
        _native: NativeWindowId,
        rect: ScreenRect,
        mode: RenderMode,
    ) -> CaptureResult<RenderOutcome> {
        lock(&self.modes).push(mode);

        match lock(&self.script).pop_front().unwrap_or(MockRender::Pattern) {
            MockRender::Pattern => {
                let size = rect.size();
                Ok(RenderOutcome::Rendered(CapturedImage::from_test_pattern(
                    size.width,
                    size.height,
                )))
            }
            MockRender::Image(image) => Ok(RenderOutcome::Rendered(image)),
            MockRender::Reject => Ok(RenderOutcome::Rejected),
            MockRender::ResourceFailure => Err(CaptureError::capture_failed(
                CaptureFailure::ResourceAcquisition,
                "mock CreateCompatibleBitmap failure",
            )),
        }
    }
}

/// Region grab returning a test pattern of the requested size.
#[derive(Debug, Default)]
pub struct MockRegionGrab {
    fail:  bool,
    grabs: Mutex<Vec<ScreenRect>>,
}

impl MockRegionGrab {
    pub fn new() -> Self {
        Self::default()
    }

    /// A grab that always fails.
    pub fn failing() -> Self {
        Self {
            fail:  true,
            grabs: Mutex::default(),
        }
    }

    pub fn grab_count(&self) -> usize {
        lock(&self.grabs).len()
    }

    /// Rectangles requested so far.
    pub fn grabbed_rects(&self) -> Vec<ScreenRect> {
        lock(&self.grabs).clone()
    }
}

impl RegionCapture for MockRegionGrab {
    fn grab(&self, rect: ScreenRect) -> CaptureResult<CapturedImage> {
        lock(&self.grabs).push(rect);

        if self.fail {
            return Err(CaptureError::capture_failed(
                CaptureFailure::RegionGrabFailed,
                "mock region grab failure",
            ));
        }

        let size = rect.size();
        Ok(CapturedImage::from_test_pattern(size.width, size.height))
    }
}
