//! Text recognition collaborator
//!
//! The core never runs OCR itself; it hands the cropped, original-resolution
//! capture to a [`TextRecognizer`]. With the `tesseract` feature a
//! [`TesseractRecognizer`] backed by the `tesseract` CLI is available.

use crate::{capture::CapturedImage, error::CaptureResult};

/// Turns pixels into text.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes text in `image`. Implementations return the raw engine
    /// output; trimming is the caller's business.
    fn recognize(&self, image: &CapturedImage) -> CaptureResult<String>;
}

/// Tesseract settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TesseractParameter {
    /// Language pack(s), `+`-separated (e.g. `eng+deu`)
    pub lang: String,
    /// Resolution hint; `None` lets tesseract guess
    pub dpi:  Option<i32>,
    /// Page segmentation mode
    pub psm:  Option<i32>,
}

impl Default for TesseractParameter {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi:  Some(150),
            psm:  None,
        }
    }
}

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "tesseract")]
mod tesseract {
    use rusty_tesseract::{Args, Image};

    use super::{TesseractParameter, TextRecognizer};
    use crate::{
        capture::CapturedImage,
        error::{CaptureError, CaptureResult},
    };

    fn ocr_failed(e: impl std::fmt::Display) -> CaptureError {
        CaptureError::OcrFailed {
            reason: e.to_string(),
        }
    }

    /// [`TextRecognizer`] running the `tesseract` binary through
    /// `rusty-tesseract`.
    #[derive(Debug, Clone, Default)]
    pub struct TesseractRecognizer {
        parameter: TesseractParameter,
    }

    impl TesseractRecognizer {
        pub fn new(parameter: TesseractParameter) -> Self {
            Self { parameter }
        }

        pub fn parameter(&self) -> &TesseractParameter {
            &self.parameter
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        #[tracing::instrument(skip(self, image), fields(lang = %self.parameter.lang))]
        fn recognize(&self, image: &CapturedImage) -> CaptureResult<String> {
            // The engine reads from disk; hand it a lossless PNG.
            let file = tempfile::Builder::new()
                .prefix("cropshot-ocr-")
                .suffix(".png")
                .tempfile()?;
            image.save_png(file.path())?;

            let input = Image::from_path(file.path()).map_err(ocr_failed)?;
            let args = Args {
                lang: self.parameter.lang.clone(),
                dpi: self.parameter.dpi,
                psm: self.parameter.psm,
                ..Args::default()
            };

            let text = rusty_tesseract::image_to_string(&input, &args).map_err(ocr_failed)?;
            tracing::debug!(chars = text.len(), "Tesseract finished");
            Ok(text)
        }
    }
}
