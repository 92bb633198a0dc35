//! Crop application

use std::borrow::Cow;

use crate::{capture::CapturedImage, error::CaptureResult, model::CropBox};

/// Returns the crop of `image`, or `image` itself when there is no crop.
///
/// The box is re-validated against the image it is applied to. A crop that
/// came out of the selector for this image always passes; a stale or
/// hand-written one fails with [`CaptureError::InvalidCrop`] instead of
/// panicking in the slicing code.
///
/// Without a crop the original is returned borrowed, so handing the full
/// capture to OCR costs no copy.
///
/// [`CaptureError::InvalidCrop`]: crate::error::CaptureError::InvalidCrop
pub fn apply_crop(
    image: &CapturedImage,
    crop: Option<CropBox>,
) -> CaptureResult<Cow<'_, CapturedImage>> {
    match crop {
        None => Ok(Cow::Borrowed(image)),
        Some(crop) => {
            let cropped = image.crop(crop)?;
            tracing::debug!(
                %crop,
                width = cropped.width(),
                height = cropped.height(),
                "Crop applied"
            );
            Ok(Cow::Owned(cropped))
        }
    }
}
