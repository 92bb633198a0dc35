//! Window resolution and pixel acquisition
//!
//! # Architecture
//!
//! Capture is split into small capability traits (see [`traits`]) and one
//! policy object, [`CaptureEngine`], that owns the fallback order:
//!
//! ```text
//! WindowHandle ──► WindowRegionResolver ──► ResolvedWindow ──► CaptureEngine ──► CapturedImage
//!                   (WindowRegionSource)                        native ─► region grab
//! ```
//!
//! ## Backends per platform
//!
//! | Platform | Enumerator | Region source | Native | Region grab |
//! |----------|------------|---------------|--------|-------------|
//! | Windows  | xcap | user32 | GDI `PrintWindow` | xcap (optional) |
//! | X11 / Wayland / macOS | xcap | xcap | - | xcap |
//! | Mock     | ✓ | ✓ | ✓ | ✓ |
//!
//! Use [`create_default_engine()`] and [`create_window_source()`] to get
//! the set for the running platform.

use std::sync::Arc;

pub mod constants;
pub mod engine;
pub mod image_buffer;
pub mod matching;
pub mod mock;
pub mod region_grab;
pub mod resolver;
pub mod traits;
pub mod xcap_windows;

#[cfg(target_os = "windows")]
pub mod windows_backend;

pub use engine::{CaptureEngine, create_default_engine, create_engine};
pub use image_buffer::CapturedImage;
pub use matching::WindowMatcher;
pub use region_grab::XcapRegionGrab;
pub use resolver::WindowRegionResolver;
pub use traits::{
    NativeWindowCapture, RegionCapture, RenderMode, RenderOutcome, WindowEnumerator,
    WindowRegionSource,
};
#[cfg(target_os = "windows")]
pub use windows_backend::{GdiWindowCapture, Win32WindowSource};
pub use xcap_windows::XcapWindows;

/// Window enumerator for the running platform.
pub fn create_window_enumerator() -> Arc<dyn WindowEnumerator> {
    Arc::new(XcapWindows::new())
}

/// Live bounds source for the running platform.
///
/// Windows reads bounds straight from user32; everything else goes through
/// xcap.
pub fn create_window_source() -> Arc<dyn WindowRegionSource> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(Win32WindowSource::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(XcapWindows::new())
    }
}
