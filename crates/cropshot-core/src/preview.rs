//! Preview coordinate mapping
//!
//! [`PreviewTransform`] is the affine map between the original capture and
//! the letterboxed preview drawn into a viewport. It is derived from the two
//! sizes and nothing else, so it is recomputed whenever either changes and
//! never stored on its own.
//!
//! ```text
//! scale      = min(viewport.w / image.w, viewport.h / image.h)
//! displayed  = (max(1, round(image.w * scale)), max(1, round(image.h * scale)))
//! offset     = ((viewport.w - displayed.w) / 2, (viewport.h - displayed.h) / 2)
//! ```
//!
//! # Examples
//!
//! ```
//! use cropshot_core::{
//!     model::{ImageSize, ViewportPoint, ViewportRect},
//!     preview::PreviewTransform,
//! };
//!
//! let t = PreviewTransform::compute(ImageSize::new(1000, 800), ImageSize::new(500, 500)).unwrap();
//! assert_eq!(t.scale(), 0.5);
//! assert_eq!(t.displayed(), ViewportRect::new(0, 50, 500, 400));
//!
//! let p = t.to_image(ViewportPoint::new(300, 250)).unwrap();
//! assert_eq!((p.x, p.y), (600.0, 400.0));
//! ```

use crate::model::{CropBox, ImagePoint, ImageSize, ViewportPoint, ViewportRect, ViewportSize};

/// Letterboxed fit of an image into a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewTransform {
    image:     ImageSize,
    viewport:  ViewportSize,
    scale:     f64,
    displayed: ViewportRect,
}

impl PreviewTransform {
    /// Fits `image` into `viewport`, or `None` when either is empty or the
    /// viewport does not fit viewport coordinates (`i32`).
    pub fn compute(image: ImageSize, viewport: ViewportSize) -> Option<Self> {
        if image.is_empty() || viewport.is_empty() {
            return None;
        }
        let vw = i32::try_from(viewport.width).ok()?;
        let vh = i32::try_from(viewport.height).ok()?;

        let scale = f64::min(
            f64::from(viewport.width) / f64::from(image.width),
            f64::from(viewport.height) / f64::from(image.height),
        );

        // round(image * scale) never exceeds the viewport because the
        // unrounded product is at most the (integer) viewport extent.
        let dw = ((f64::from(image.width) * scale).round() as i64).max(1) as i32;
        let dh = ((f64::from(image.height) * scale).round() as i64).max(1) as i32;

        let displayed = ViewportRect::new((vw - dw) / 2, (vh - dh) / 2, dw, dh);

        Some(Self {
            image,
            viewport,
            scale,
            displayed,
        })
    }

    /// Viewport pixels per image pixel; always positive.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Where the image is drawn inside the viewport.
    pub fn displayed(&self) -> ViewportRect {
        self.displayed
    }

    pub fn image_size(&self) -> ImageSize {
        self.image
    }

    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport
    }

    /// Maps a viewport point to image coordinates.
    ///
    /// Returns `None` outside the displayed rectangle (letterbox bars count as
    /// outside). The result is clamped to `[0, w] x [0, h]`.
    pub fn to_image(&self, p: ViewportPoint) -> Option<ImagePoint> {
        if !self.displayed.contains(p) {
            return None;
        }
        Some(self.unproject(f64::from(p.x), f64::from(p.y)))
    }

    /// Maps a viewport point to image coordinates after pinning it onto the
    /// displayed rectangle, so points past an edge land on that edge.
    ///
    /// The far edges map exactly to the image's width and height even when
    /// the displayed size was rounded down.
    pub fn to_image_clamped(&self, p: ViewportPoint) -> ImagePoint {
        let d = self.displayed;
        let x = p.x.clamp(d.x, d.x + d.width);
        let y = p.y.clamp(d.y, d.y + d.height);
        let mapped = self.unproject(f64::from(x), f64::from(y));
        ImagePoint::new(
            if x == d.x + d.width { f64::from(self.image.width) } else { mapped.x },
            if y == d.y + d.height { f64::from(self.image.height) } else { mapped.y },
        )
    }

    /// Maps an image point to the nearest viewport pixel.
    pub fn to_viewport(&self, p: ImagePoint) -> ViewportPoint {
        ViewportPoint::new(
            (p.x * self.scale).round() as i32 + self.displayed.x,
            (p.y * self.scale).round() as i32 + self.displayed.y,
        )
    }

    /// Viewport rectangle spanned by two image points, at least 1x1.
    pub fn rect_to_viewport(&self, a: ImagePoint, b: ImagePoint) -> ViewportRect {
        let p0 = self.to_viewport(ImagePoint::new(a.x.min(b.x), a.y.min(b.y)));
        let p1 = self.to_viewport(ImagePoint::new(a.x.max(b.x), a.y.max(b.y)));
        ViewportRect::new(p0.x, p0.y, (p1.x - p0.x).max(1), (p1.y - p0.y).max(1))
    }

    /// Viewport rectangle covering a crop box, at least 1x1.
    pub fn crop_to_viewport(&self, crop: CropBox) -> ViewportRect {
        self.rect_to_viewport(
            ImagePoint::new(f64::from(crop.left), f64::from(crop.top)),
            ImagePoint::new(f64::from(crop.right), f64::from(crop.bottom)),
        )
    }

    fn unproject(&self, vx: f64, vy: f64) -> ImagePoint {
        let x = (vx - f64::from(self.displayed.x)) / self.scale;
        let y = (vy - f64::from(self.displayed.y)) / self.scale;
        ImagePoint::new(
            x.clamp(0.0, f64::from(self.image.width)),
            y.clamp(0.0, f64::from(self.image.height)),
        )
    }
}
