//! Screen-region grab via xcap
//!
//! Captures the monitor under the rectangle's center and copies the
//! rectangle out of it. Anything drawn on top of the target window is part of
//! the result. Pixels of the rectangle that fall outside that monitor stay
//! black, so the output always has the rectangle's exact size.

use std::time::Instant;

use image::{RgbaImage, imageops};
use xcap::Monitor;

use super::{CapturedImage, RegionCapture};
use crate::{
    error::{CaptureError, CaptureFailure, CaptureResult},
    model::ScreenRect,
};

fn grab_failed(detail: impl Into<String>) -> CaptureError {
    CaptureError::capture_failed(CaptureFailure::RegionGrabFailed, detail)
}

/// Region grab backed by `xcap::Monitor`.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapRegionGrab;

impl XcapRegionGrab {
    pub fn new() -> Self {
        Self
    }
}

impl RegionCapture for XcapRegionGrab {
    #[tracing::instrument(skip(self))]
    fn grab(&self, rect: ScreenRect) -> CaptureResult<CapturedImage> {
        if !rect.has_area() {
            return Err(grab_failed(format!("empty rectangle {:?}", rect)));
        }

        let start = Instant::now();
        let (cx, cy) = rect.center();

        let monitor = Monitor::from_point(cx, cy)
            .map_err(|e| grab_failed(format!("no monitor at ({}, {}): {}", cx, cy, e)))?;
        let mon_x = monitor.x().map_err(|e| grab_failed(e.to_string()))?;
        let mon_y = monitor.y().map_err(|e| grab_failed(e.to_string()))?;
        let mon_w = monitor.width().map_err(|e| grab_failed(e.to_string()))?;
        let mon_h = monitor.height().map_err(|e| grab_failed(e.to_string()))?;

        let shot = monitor
            .capture_image()
            .map_err(|e| grab_failed(format!("monitor capture failed: {}", e)))?;

        tracing::debug!(
            mon_x,
            mon_y,
            mon_w,
            mon_h,
            shot_w = shot.width(),
            shot_h = shot.height(),
            "Monitor captured"
        );

        // HiDPI monitors return physical pixels; bring them back to the
        // logical grid the window rectangle is expressed in.
        let shot = if (shot.width(), shot.height()) != (mon_w, mon_h) && mon_w > 0 && mon_h > 0 {
            imageops::resize(&shot, mon_w, mon_h, imageops::FilterType::Triangle)
        } else {
            shot
        };

        let size = rect.size();
        let mut canvas = RgbaImage::from_pixel(size.width, size.height, image::Rgba([0, 0, 0, 255]));
        imageops::replace(
            &mut canvas,
            &shot,
            i64::from(mon_x) - i64::from(rect.left),
            i64::from(mon_y) - i64::from(rect.top),
        );

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            "Region extracted"
        );

        Ok(CapturedImage::from_rgba(canvas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rect_rejected() {
        let err = XcapRegionGrab::new().grab(ScreenRect::new(0, 0, 0, 10)).unwrap_err();
        assert_eq!(err.failure_reason(), Some(CaptureFailure::RegionGrabFailed));
    }

    #[test]
    #[ignore = "Requires a desktop session"]
    fn test_grab_has_rect_size() {
        let rect = ScreenRect::new(0, 0, 200, 100);
        let image = XcapRegionGrab::new().grab(rect).unwrap();
        assert_eq!(image.dimensions(), (200, 100));
    }

    #[test]
    #[ignore = "Requires a desktop session"]
    fn test_grab_partially_offscreen_keeps_size() {
        let rect = ScreenRect::new(-50, -50, 200, 100);
        let image = XcapRegionGrab::new().grab(rect).unwrap();
        assert_eq!(image.dimensions(), (200, 100));
    }
}
