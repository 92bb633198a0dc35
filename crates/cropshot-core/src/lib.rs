//! cropshot-core: window capture, preview mapping and crop selection
//!
//! Captures one application window, maps pointer input on a scaled preview
//! back to original pixels, and hands an original-resolution crop to a text
//! recognizer.
//!
//! The pipeline, leaf first:
//! - [`capture`]: live window bounds, native capture with a region-grab
//!   fallback
//! - [`preview`]: the letterboxed preview transform
//! - [`selection`]: the drag-to-crop state machine
//! - [`crop`]: slicing the capture
//! - [`session`]: the owner of all of the above

pub mod capture;
pub mod crop;
pub mod error;
pub mod model;
pub mod ocr;
pub mod preview;
pub mod selection;
pub mod session;
pub mod util;

pub use error::{CaptureError, CaptureFailure, CaptureResult};
pub use session::{CaptureSession, SessionConfig};
