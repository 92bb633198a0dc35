//! Data models and type definitions for cropshot
//!
//! This module defines the plain value types shared by every stage of the
//! pipeline:
//! - Platform and backend detection types
//! - Screen-space window rectangles and handles
//! - Image-space and viewport-space geometry (sizes, points, rectangles)
//! - The [`CropBox`] handed to the crop applicator
//!
//! All types are small `Copy`/`Clone` structs with serde support so they can
//! cross a JSON boundary unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};

/// Represents the display backend type for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// No backend detected or not yet initialized
    None,
    /// Wayland display server (Linux)
    Wayland,
    /// X11 display server (Linux)
    X11,
    /// Win32 / GDI
    Windows,
    /// macOS
    #[serde(rename = "macos")]
    MacOS,
}

impl BackendType {
    /// Returns the backend type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::None => "none",
            BackendType::Wayland => "wayland",
            BackendType::X11 => "x11",
            BackendType::Windows => "windows",
            BackendType::MacOS => "macos",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Platform information including OS and display backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Operating system name (e.g., "linux", "windows", "macos")
    pub os:      String,
    /// Detected display backend
    pub backend: BackendType,
}

impl PlatformInfo {
    /// Creates a new PlatformInfo instance
    pub fn new(os: String, backend: BackendType) -> Self {
        Self { os, backend }
    }
}

/// Raw native window handle value (an `HWND` on Windows).
pub type NativeWindowId = isize;

/// A window rectangle in screen coordinates.
///
/// Width and height are signed because the OS may report degenerate or
/// negative extents for windows that are being destroyed; the resolver
/// rejects those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left:   i32,
    pub top:    i32,
    pub width:  i32,
    pub height: i32,
}

impl ScreenRect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a rectangle from `(left, top, right, bottom)` edges.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// True when both extents are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }

    /// Pixel size of the rectangle; zero for degenerate extents.
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width.max(0) as u32, self.height.max(0) as u32)
    }
}

/// A window chosen by the user for capture.
///
/// `rect` is the last-known rectangle only. It is refreshed through the
/// resolver right before every capture because the window may have moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowHandle {
    /// Opaque identifier understood by the window source that produced it
    pub id:     String,
    /// Native OS handle usable by the primary capture path, when there is one
    pub native: Option<NativeWindowId>,
    /// Last-known screen rectangle
    pub rect:   ScreenRect,
    /// Display title
    pub title:  String,
}

impl WindowHandle {
    pub fn new(id: impl Into<String>, title: impl Into<String>, rect: ScreenRect) -> Self {
        Self {
            id: id.into(),
            native: None,
            rect,
            title: title.into(),
        }
    }

    pub fn with_native(mut self, native: NativeWindowId) -> Self {
        self.native = Some(native);
        self
    }
}

/// Live window state re-read from the OS immediately before capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub rect:    ScreenRect,
    /// False when the window is minimized or hidden
    pub visible: bool,
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width:  u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Size of the preview surface the presentation layer draws into.
pub type ViewportSize = ImageSize;

/// A pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportPoint {
    pub x: i32,
    pub y: i32,
}

impl ViewportPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A point in original-image coordinates.
///
/// Kept fractional so that repeated conversions during a drag do not
/// accumulate rounding error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An integer rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub x:      i32,
    pub y:      i32,
    pub width:  i32,
    pub height: i32,
}

impl ViewportRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: ViewportPoint) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// A crop rectangle in original-image coordinates.
///
/// Edges are `(left, top, right, bottom)` with `right`/`bottom` exclusive.
/// Construct through [`CropBox::within`] to get the bounds and minimum-size
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropBox {
    pub left:   u32,
    pub top:    u32,
    pub right:  u32,
    pub bottom: u32,
}

impl CropBox {
    /// Validates the edges against `bounds` and the minimum side length.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidCrop`] when the box is inverted, leaves the
    /// image, or either side is shorter than `min_side`.
    pub fn within(
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        bounds: ImageSize,
        min_side: u32,
    ) -> CaptureResult<Self> {
        let crop = Self {
            left,
            top,
            right,
            bottom,
        };
        crop.validate(bounds, min_side)?;
        Ok(crop)
    }

    /// Re-checks the invariants against an image size.
    pub fn validate(&self, bounds: ImageSize, min_side: u32) -> CaptureResult<()> {
        if self.left >= self.right || self.top >= self.bottom {
            return Err(CaptureError::InvalidCrop {
                reason: format!(
                    "edges are inverted or empty: ({}, {}, {}, {})",
                    self.left, self.top, self.right, self.bottom
                ),
            });
        }

        if self.right > bounds.width || self.bottom > bounds.height {
            return Err(CaptureError::InvalidCrop {
                reason: format!(
                    "({}, {}, {}, {}) extends beyond image bounds ({}x{})",
                    self.left, self.top, self.right, self.bottom, bounds.width, bounds.height
                ),
            });
        }

        if self.width() < min_side || self.height() < min_side {
            return Err(CaptureError::InvalidCrop {
                reason: format!(
                    "{}x{} is smaller than the {}px minimum",
                    self.width(),
                    self.height(),
                    min_side
                ),
            });
        }

        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

impl std::fmt::Display for CropBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) -> ({}, {})", self.left, self.top, self.right, self.bottom)
    }
}

impl std::str::FromStr for CropBox {
    type Err = String;

    /// Parses `left,top,right,bottom`. Bounds are checked later against the
    /// image the box is applied to.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid crop '{}': {}", s, e))?;

        match parts.as_slice() {
            [left, top, right, bottom] => Ok(Self {
                left:   *left,
                top:    *top,
                right:  *right,
                bottom: *bottom,
            }),
            _ => Err(format!("expected left,top,right,bottom, got '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_type_serialization() {
        assert_eq!(serde_json::to_string(&BackendType::None).unwrap(), r#""none""#);
        assert_eq!(serde_json::to_string(&BackendType::Windows).unwrap(), r#""windows""#);
        assert_eq!(serde_json::to_string(&BackendType::MacOS).unwrap(), r#""macos""#);
        assert_eq!(
            serde_json::from_str::<BackendType>(r#""x11""#).unwrap(),
            BackendType::X11
        );
    }

    #[test]
    fn test_screen_rect_edges() {
        let rect = ScreenRect::from_edges(10, 20, 110, 70);
        assert_eq!(rect, ScreenRect::new(10, 20, 100, 50));
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.center(), (60, 45));
        assert!(rect.has_area());
        assert!(!ScreenRect::new(0, 0, 0, 10).has_area());
        assert!(!ScreenRect::new(0, 0, 10, -1).has_area());
        assert_eq!(ScreenRect::new(0, 0, -5, 3).size(), ImageSize::new(0, 3));
    }

    #[test]
    fn test_viewport_rect_contains_is_half_open() {
        let rect = ViewportRect::new(0, 50, 500, 400);
        assert!(rect.contains(ViewportPoint::new(0, 50)));
        assert!(rect.contains(ViewportPoint::new(499, 449)));
        assert!(!rect.contains(ViewportPoint::new(500, 100)));
        assert!(!rect.contains(ViewportPoint::new(100, 450)));
        assert!(!rect.contains(ViewportPoint::new(-1, 100)));
    }

    #[test]
    fn test_crop_box_within_valid() {
        let bounds = ImageSize::new(1000, 800);
        let crop = CropBox::within(200, 0, 600, 400, bounds, 10).unwrap();
        assert_eq!(crop.width(), 400);
        assert_eq!(crop.height(), 400);

        // Full image is a valid crop
        assert!(CropBox::within(0, 0, 1000, 800, bounds, 10).is_ok());
    }

    #[test]
    fn test_crop_box_within_rejects_invalid() {
        let bounds = ImageSize::new(100, 100);
        assert!(CropBox::within(50, 10, 50, 60, bounds, 10).is_err());
        assert!(CropBox::within(60, 10, 50, 60, bounds, 10).is_err());
        assert!(CropBox::within(0, 0, 101, 50, bounds, 10).is_err());
        assert!(CropBox::within(0, 0, 50, 101, bounds, 10).is_err());
        assert!(CropBox::within(0, 0, 9, 50, bounds, 10).is_err());
        assert!(CropBox::within(0, 0, 50, 9, bounds, 10).is_err());
        assert!(CropBox::within(0, 0, 10, 10, bounds, 10).is_ok());
    }

    #[test]
    fn test_crop_box_parse() {
        let crop: CropBox = "10, 20,300,400".parse().unwrap();
        assert_eq!(
            crop,
            CropBox {
                left:   10,
                top:    20,
                right:  300,
                bottom: 400,
            }
        );
        assert!("1,2,3".parse::<CropBox>().is_err());
        assert!("a,b,c,d".parse::<CropBox>().is_err());
        assert!("-1,0,10,10".parse::<CropBox>().is_err());
    }

    #[test]
    fn test_crop_box_json_shape() {
        let crop = CropBox {
            left:   1,
            top:    2,
            right:  30,
            bottom: 40,
        };
        let json = serde_json::to_value(crop).unwrap();
        assert_eq!(json["left"], 1);
        assert_eq!(json["bottom"], 40);
    }

    #[test]
    fn test_window_handle_builder() {
        let handle = WindowHandle::new("42", "Notepad", ScreenRect::new(0, 0, 640, 480))
            .with_native(0x42);
        assert_eq!(handle.native, Some(0x42));
        assert_eq!(handle.title, "Notepad");
    }
}
