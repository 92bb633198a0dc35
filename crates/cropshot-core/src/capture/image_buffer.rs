//! Captured pixel buffer
//!
//! [`CapturedImage`] wraps an `image::RgbImage` in canonical RGB byte order.
//! Capture backends hand over whatever layout the OS produced (BGRX from GDI,
//! RGBA from xcap) and this type normalizes it once, at construction.
//!
//! All transformation methods return new images; the original is never
//! mutated.
//!
//! # Examples
//!
//! ```
//! use cropshot_core::{capture::CapturedImage, model::CropBox};
//!
//! let img = CapturedImage::from_test_pattern(1000, 800);
//! let preview = img.resize_to(500, 400);
//! assert_eq!(preview.dimensions(), (500, 400));
//!
//! let crop: CropBox = "200,0,600,400".parse().unwrap();
//! let cropped = img.crop(crop).unwrap();
//! assert_eq!(cropped.dimensions(), (400, 400));
//! ```

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::{
    error::{CaptureError, CaptureResult},
    model::{CropBox, ImageSize},
};

/// Immutable, original-resolution RGB capture.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedImage {
    inner: RgbImage,
}

impl CapturedImage {
    /// Wraps an RGB buffer.
    pub fn new(image: RgbImage) -> Self {
        Self { inner: image }
    }

    /// Normalizes an RGBA buffer (xcap output) to RGB, dropping alpha.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self::new(DynamicImage::ImageRgba8(image).to_rgb8())
    }

    /// Reinterprets 32-bit BGRX rows (GDI `GetDIBits` output) as RGB.
    ///
    /// `bytes` must hold exactly `width * height * 4` bytes, top-down.
    pub fn from_bgrx(width: u32, height: u32, bytes: &[u8]) -> CaptureResult<Self> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(CaptureError::ImageError(format!(
                "BGRX buffer has {} bytes, expected {} for {}x{}",
                bytes.len(),
                expected,
                width,
                height
            )));
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for px in bytes.chunks_exact(4) {
            rgb.push(px[2]); // R
            rgb.push(px[1]); // G
            rgb.push(px[0]); // B
        }

        RgbImage::from_raw(width, height, rgb)
            .map(Self::new)
            .ok_or_else(|| CaptureError::ImageError("failed to build image from BGRX".into()))
    }

    /// Slices `crop` out of the image into a new buffer.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidCrop`] when the box is empty or leaves the
    /// image.
    pub fn crop(&self, crop: CropBox) -> CaptureResult<Self> {
        crop.validate(self.size(), 1)?;

        let view = image::imageops::crop_imm(
            &self.inner,
            crop.left,
            crop.top,
            crop.width(),
            crop.height(),
        );
        Ok(Self::new(view.to_image()))
    }

    /// Resizes to exact dimensions with Lanczos3 filtering.
    ///
    /// Used for preview rendering only; never feed the result to OCR.
    pub fn resize_to(&self, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        if (width, height) == self.dimensions() {
            return self.clone();
        }

        Self::new(image::imageops::resize(
            &self.inner,
            width,
            height,
            image::imageops::FilterType::Lanczos3,
        ))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    pub fn size(&self) -> ImageSize {
        let (width, height) = self.dimensions();
        ImageSize::new(width, height)
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Raw RGB bytes, row-major, three bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_raw()
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// A horizontal red ramp over a vertical green ramp, so every pixel of a
    /// crop can be traced back to its source coordinates in tests.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                0x80,
            ])
        });

        Self::new(img)
    }

    /// Returns a reference to the inner RGB buffer
    pub fn inner(&self) -> &RgbImage {
        &self.inner
    }

    /// Writes the image as PNG.
    pub fn save_png(&self, path: &std::path::Path) -> CaptureResult<()> {
        self.inner
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| match e {
                image::ImageError::IoError(io) => CaptureError::IoError(io),
                other => CaptureError::ImageError(other.to_string()),
            })
    }
}
