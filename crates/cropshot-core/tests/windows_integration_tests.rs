//! Windows backend integration tests
//!
//! These tests need an interactive Windows desktop with real top-level
//! windows, so they are ignored by default.
//!
//! # Running Tests
//!
//! ```powershell
//! # Run all Windows integration tests with full output
//! cargo test --test windows_integration_tests -- --ignored --nocapture
//!
//! # Run with debug logging
//! set RUST_LOG=cropshot_core=debug
//! cargo test --test windows_integration_tests -- --ignored --nocapture
//! ```
//!
//! # Requirements
//!
//! - Windows 10 or later with a visible primary display
//! - At least one ordinary application window open (Notepad, Explorer)
//!
//! Captured images are written to `target/test_output/` for inspection.

#![cfg(target_os = "windows")]

mod common;

use std::sync::Arc;

use common::test_output_dir;
use cropshot_core::{
    capture::{
        CaptureEngine, GdiWindowCapture, NativeWindowCapture, RenderMode, RenderOutcome,
        WindowEnumerator, WindowMatcher, WindowRegionResolver, WindowRegionSource,
        Win32WindowSource, XcapRegionGrab, XcapWindows, create_default_engine,
    },
    model::{ImageSize, ViewportPoint, WindowHandle},
    session::{CaptureSession, SessionConfig},
};

fn first_window() -> WindowHandle {
    let windows = XcapWindows::new().list_windows().expect("Failed to list windows");
    windows
        .into_iter()
        .find(|w| w.native.is_some() && w.rect.width >= 100 && w.rect.height >= 100)
        .expect("No suitable window open")
}

#[test]
#[ignore = "Requires a Windows desktop"]
fn test_list_windows_real() {
    let windows = XcapWindows::new().list_windows().expect("Failed to list windows");
    println!("Found {} windows", windows.len());

    assert!(!windows.is_empty(), "Should find at least one window");
    for w in &windows {
        assert!(!w.title.trim().is_empty());
        assert!(w.rect.has_area(), "{} has no area", w.title);
        assert_eq!(w.native, w.id.parse().ok(), "native id should be the HWND");
    }
}

#[test]
#[ignore = "Requires a Windows desktop"]
fn test_win32_source_matches_xcap() {
    let handle = first_window();
    let resolved = Win32WindowSource::new()
        .refresh(&handle)
        .expect("refresh failed")
        .expect("window vanished");

    println!("xcap: {:?}, user32: {:?}", handle.rect, resolved.rect);
    assert_eq!(resolved.rect.size(), handle.rect.size());
    assert!(resolved.visible);
}

#[test]
#[ignore = "Requires a Windows desktop"]
fn test_gdi_render_real() {
    let handle = first_window();
    let native = handle.native.expect("xcap windows carry an HWND");

    match GdiWindowCapture::new()
        .render(native, handle.rect, RenderMode::FullContent)
        .expect("GDI resource failure")
    {
        RenderOutcome::Rendered(image) => {
            assert_eq!(image.size(), handle.rect.size());
            let path = test_output_dir().join("gdi_render.png");
            image.save_png(&path).expect("Failed to save image");
            println!("Saved {}", path.display());
        }
        RenderOutcome::Rejected => println!("{} declined PrintWindow", handle.title),
    }
}

#[test]
#[ignore = "Requires a Windows desktop"]
fn test_region_grab_real() {
    let handle = first_window();
    let engine = CaptureEngine::new(None, Some(Arc::new(XcapRegionGrab::new())), "region-only");
    let resolved = WindowRegionResolver::new(Arc::new(Win32WindowSource::new()))
        .resolve(&handle)
        .expect("Failed to resolve window");

    let image = engine.capture(&handle, &resolved).expect("Region grab failed");
    assert_eq!(image.size(), resolved.rect.size());
}

#[test]
#[ignore = "Requires a Windows desktop"]
fn test_session_capture_and_crop_real() {
    let windows = XcapWindows::new().list_windows().expect("Failed to list windows");
    let handle = WindowMatcher::new("explorer|notepad")
        .find(&windows)
        .cloned()
        .unwrap_or_else(first_window);
    println!("Capturing '{}'", handle.title);

    let mut session = CaptureSession::new(
        SessionConfig::default(),
        Arc::new(Win32WindowSource::new()),
        create_default_engine(),
    );
    session.select_window(handle);

    let (w, h) = session.take_capture().expect("Capture failed").dimensions();
    session.set_viewport(ImageSize::new(w / 2, h / 2));

    let d = session.transform().expect("preview").displayed();
    session.arm_crop();
    session.pointer_down(ViewportPoint::new(d.x + d.width / 4, d.y + d.height / 4));
    session.pointer_up(ViewportPoint::new(d.x + d.width * 3 / 4, d.y + d.height * 3 / 4));

    let crop = session.crop_box().expect("drag should commit a crop");
    let cropped = session.cropped_image().expect("crop failed");
    assert_eq!(cropped.dimensions(), (crop.width(), crop.height()));

    let path = test_output_dir().join("session_crop.png");
    cropped.save_png(&path).expect("Failed to save image");
    println!("Saved {} ({})", path.display(), crop);
}
