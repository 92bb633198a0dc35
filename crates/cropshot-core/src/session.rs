//! Capture session
//!
//! [`CaptureSession`] is the single owner of the selected window, the live
//! capture and the crop selection. A presentation layer drives it with
//! viewport sizes and pointer events and renders [`CaptureSession::preview_image`]
//! plus [`CaptureSession::overlay`]; a worker hands
//! [`CaptureSession::cropped_image`] to OCR.
//!
//! Capture takes `&mut self`, so two captures can never overlap and no
//! reference into an old capture survives its replacement.

use std::{borrow::Cow, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    capture::{
        CaptureEngine, CapturedImage, WindowRegionResolver, WindowRegionSource, constants,
        create_default_engine, create_window_source,
    },
    crop::apply_crop,
    error::{CaptureError, CaptureResult},
    model::{CropBox, ViewportPoint, ViewportRect, ViewportSize, WindowHandle},
    ocr::TextRecognizer,
    preview::PreviewTransform,
    selection::{CropChange, CropSelector, SelectionContext, SelectionEvent, SelectionState},
};

/// Session tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum crop side in original-image pixels
    pub min_crop_px: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_crop_px: constants::MIN_CROP_SIZE_PX,
        }
    }
}

impl SessionConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            min_crop_px: constants::min_crop_size_px(),
        }
    }
}

/// One window, one capture, one crop.
#[derive(Debug)]
pub struct CaptureSession {
    config:   SessionConfig,
    resolver: WindowRegionResolver,
    engine:   CaptureEngine,
    window:   Option<WindowHandle>,
    image:    Option<CapturedImage>,
    viewport: Option<ViewportSize>,
    selector: CropSelector,
}

impl CaptureSession {
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn WindowRegionSource>,
        engine: CaptureEngine,
    ) -> Self {
        Self {
            config,
            resolver: WindowRegionResolver::new(source),
            engine,
            window: None,
            image: None,
            viewport: None,
            selector: CropSelector::new(),
        }
    }

    /// Session wired to the running platform's backends.
    pub fn with_platform_defaults() -> Self {
        Self::new(SessionConfig::from_env(), create_window_source(), create_default_engine())
    }

    pub fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    // ------------------------------------------------------------------
    // Window and capture
    // ------------------------------------------------------------------

    /// Selects the window to capture. Any previous capture and crop are
    /// dropped.
    pub fn select_window(&mut self, handle: WindowHandle) {
        tracing::info!(id = %handle.id, title = %handle.title, "Window selected");
        self.window = Some(handle);
        self.image = None;
        let ctx = self.context();
        self.selector.handle(SelectionEvent::Reset, &ctx);
    }

    pub fn selected_window(&self) -> Option<&WindowHandle> {
        self.window.as_ref()
    }

    /// Captures the selected window at its current position.
    ///
    /// On success the new image replaces the old one and the crop selection
    /// is reset to `Idle`. On failure the previous capture and crop are kept.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NoWindowSelected`]
    /// - [`CaptureError::WindowUnavailable`] from the resolver
    /// - [`CaptureError::CaptureFailed`] from the engine
    #[tracing::instrument(skip(self))]
    pub fn take_capture(&mut self) -> CaptureResult<&CapturedImage> {
        let handle = self.window.as_ref().ok_or(CaptureError::NoWindowSelected)?;

        let resolved = self.resolver.resolve(handle)?;
        let image = self.engine.capture(handle, &resolved)?;

        if let Some(window) = self.window.as_mut() {
            window.rect = resolved.rect;
        }

        self.image = Some(image);
        let ctx = self.context();
        self.selector.handle(SelectionEvent::Reset, &ctx);

        self.image.as_ref().ok_or(CaptureError::NoCapture)
    }

    /// The original-resolution capture.
    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    // ------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------

    /// Records the size of the preview surface.
    pub fn set_viewport(&mut self, size: ViewportSize) {
        self.viewport = Some(size);
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.viewport
    }

    /// Current fit of the capture into the viewport, recomputed on each call.
    pub fn transform(&self) -> Option<PreviewTransform> {
        PreviewTransform::compute(self.image.as_ref()?.size(), self.viewport?)
    }

    /// Capture scaled to its displayed size, for drawing at
    /// `transform().displayed()`.
    pub fn preview_image(&self) -> Option<CapturedImage> {
        let image = self.image.as_ref()?;
        let displayed = self.transform()?.displayed();
        Some(image.resize_to(displayed.width as u32, displayed.height as u32))
    }

    /// Rectangle to draw over the preview.
    pub fn overlay(&self) -> Option<ViewportRect> {
        self.selector.overlay(self.transform().as_ref())
    }

    // ------------------------------------------------------------------
    // Crop selection
    // ------------------------------------------------------------------

    fn context(&self) -> SelectionContext {
        SelectionContext {
            image:    self.image.as_ref().map(CapturedImage::size),
            preview:  self.transform(),
            min_side: self.config.min_crop_px,
        }
    }

    /// Feeds one event to the crop selector.
    pub fn handle_event(&mut self, event: SelectionEvent) -> CropChange {
        let ctx = self.context();
        self.selector.handle(event, &ctx)
    }

    pub fn arm_crop(&mut self) -> CropChange {
        self.handle_event(SelectionEvent::Arm)
    }

    pub fn cancel_crop(&mut self) -> CropChange {
        self.handle_event(SelectionEvent::Cancel)
    }

    pub fn clear_crop(&mut self) -> CropChange {
        self.handle_event(SelectionEvent::Clear)
    }

    /// The crop button: cancel, clear or arm depending on the state.
    pub fn toggle_crop(&mut self) -> CropChange {
        let ctx = self.context();
        self.selector.toggle(&ctx)
    }

    pub fn pointer_down(&mut self, p: ViewportPoint) -> CropChange {
        self.handle_event(SelectionEvent::pointer_down(p))
    }

    pub fn pointer_move(&mut self, p: ViewportPoint, primary_down: bool) -> CropChange {
        self.handle_event(SelectionEvent::pointer_move(p, primary_down))
    }

    pub fn pointer_up(&mut self, p: ViewportPoint) -> CropChange {
        self.handle_event(SelectionEvent::pointer_up(p))
    }

    /// Commits a crop given in image coordinates.
    ///
    /// # Errors
    ///
    /// - [`CaptureError::NoCapture`]
    /// - [`CaptureError::InvalidCrop`] when the box leaves the image or is
    ///   smaller than the configured minimum
    pub fn set_crop(&mut self, crop: CropBox) -> CaptureResult<()> {
        let image = self.image.as_ref().ok_or(CaptureError::NoCapture)?;
        crop.validate(image.size(), self.config.min_crop_px)?;
        self.selector.commit(crop);
        Ok(())
    }

    pub fn selection_state(&self) -> &SelectionState {
        self.selector.state()
    }

    pub fn crop_box(&self) -> Option<CropBox> {
        self.selector.crop_box()
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// The capture with the crop in effect applied, at original resolution.
    pub fn cropped_image(&self) -> CaptureResult<Cow<'_, CapturedImage>> {
        let image = self.image.as_ref().ok_or(CaptureError::NoCapture)?;
        apply_crop(image, self.crop_box())
    }

    /// Runs `recognizer` on [`Self::cropped_image`] and trims the result.
    #[tracing::instrument(skip(self, recognizer))]
    pub fn recognize_text(&self, recognizer: &dyn TextRecognizer) -> CaptureResult<String> {
        let image = self.cropped_image()?;
        let text = recognizer.recognize(&image)?;
        let trimmed = text.trim().to_string();
        tracing::info!(chars = trimmed.chars().count(), "Text recognized");
        Ok(trimmed)
    }
}
