//! Shared fixtures for session integration tests
//!
//! `SessionHarness` wires a [`CaptureSession`] to the mock collaborators and
//! keeps handles to them so tests can script the OS side (move or close the
//! window, reject renders) and inspect what the engine asked for.

#![allow(dead_code)] // Not every test file uses every helper

use std::sync::Arc;

use cropshot_core::{
    capture::{
        CaptureEngine,
        mock::{MockNativeCapture, MockRegionGrab, MockRender, MockWindowSource},
    },
    model::{ImageSize, ScreenRect, ViewportPoint, WindowHandle},
    session::{CaptureSession, SessionConfig},
};

pub const WINDOW_ID: &str = "4242";

pub struct SessionHarness {
    pub session: CaptureSession,
    pub source:  Arc<MockWindowSource>,
    pub native:  Arc<MockNativeCapture>,
    pub region:  Arc<MockRegionGrab>,
}

impl SessionHarness {
    /// A session over one visible `width x height` window, selected.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_script(width, height, [])
    }

    /// Like [`SessionHarness::new`] with scripted native outcomes.
    pub fn with_script(
        width: i32,
        height: i32,
        script: impl IntoIterator<Item = MockRender>,
    ) -> Self {
        let handle = window(width, height);

        let source = Arc::new(MockWindowSource::new());
        source.add_window(handle.clone(), true);

        let native = Arc::new(MockNativeCapture::new().script(script));
        let region = Arc::new(MockRegionGrab::new());
        let engine = CaptureEngine::new(Some(native.clone()), Some(region.clone()), "mock");

        let mut session = CaptureSession::new(SessionConfig::default(), source.clone(), engine);
        session.select_window(handle);

        Self {
            session,
            source,
            native,
            region,
        }
    }

    /// Captures and sets the viewport in one go.
    pub fn capture_into(&mut self, viewport_w: u32, viewport_h: u32) {
        self.session.take_capture().expect("capture should succeed");
        self.session.set_viewport(ImageSize::new(viewport_w, viewport_h));
    }

    /// Arms and performs a full drag from `from` to `to`.
    pub fn drag(&mut self, from: (i32, i32), to: (i32, i32)) {
        self.session.arm_crop();
        self.session.pointer_down(ViewportPoint::new(from.0, from.1));
        self.session.pointer_move(ViewportPoint::new(to.0, to.1), true);
        self.session.pointer_up(ViewportPoint::new(to.0, to.1));
    }
}

pub fn window(width: i32, height: i32) -> WindowHandle {
    WindowHandle::new(WINDOW_ID, "Scanned Invoice", ScreenRect::new(120, 80, width, height))
        .with_native(0x4242)
}

/// Directory for images written by desktop tests, created on demand.
pub fn test_output_dir() -> std::path::PathBuf {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("target/test_output");
    std::fs::create_dir_all(&dir).expect("Failed to create test output directory");
    dir
}
