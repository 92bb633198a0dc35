//! Error types for window capture and crop operations
//!
//! This module defines the error taxonomy of the capture pipeline with
//! user-facing messages and actionable remediation hints. Every error is
//! terminal to the single operation that raised it; nothing here retries.

use serde::{Deserialize, Serialize};

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Why a capture attempt failed after every available path was tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFailure {
    /// The window is minimized or hidden and the native path could not
    /// render it
    WindowInvisible,
    /// A device context, bitmap or pixel readback could not be obtained
    ResourceAcquisition,
    /// No capture backend exists for this platform or configuration
    NoBackend,
    /// The compositor refused to render the window and no fallback is wired
    RenderRejected,
    /// The screen-region grab fallback failed
    RegionGrabFailed,
}

impl CaptureFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureFailure::WindowInvisible => "window_invisible",
            CaptureFailure::ResourceAcquisition => "resource_acquisition",
            CaptureFailure::NoBackend => "no_backend",
            CaptureFailure::RenderRejected => "render_rejected",
            CaptureFailure::RegionGrabFailed => "region_grab_failed",
        }
    }
}

impl std::fmt::Display for CaptureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for the capture pipeline
///
/// Each variant includes detailed context and provides remediation hints
/// through the `remediation_hint()` method.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The selected window no longer exists or reports no area
    #[error("Window '{window}' is unavailable: {reason}")]
    WindowUnavailable {
        /// Title or id of the window
        window: String,
        /// What the live query returned
        reason: String,
    },

    /// Every capture path failed
    #[error("Capture failed ({reason}): {detail}")]
    CaptureFailed {
        /// Distinguishing reason code
        reason: CaptureFailure,
        /// Backend-specific detail
        detail: String,
    },

    /// A crop rectangle violates the bounds or minimum-size invariants
    #[error("Invalid crop: {reason}")]
    InvalidCrop {
        /// Which invariant failed
        reason: String,
    },

    /// The window list could not be read from the OS
    #[error("Window enumeration failed: {reason}")]
    EnumerationFailed {
        /// Backend error text
        reason: String,
    },

    /// The operation needs a captured image and there is none
    #[error("No capture has been taken yet")]
    NoCapture,

    /// The operation needs a selected window and there is none
    #[error("No window has been selected")]
    NoWindowSelected,

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The text recognizer failed
    #[error("Text recognition failed: {reason}")]
    OcrFailed {
        /// Recognizer output or error
        reason: String,
    },
}

impl CaptureError {
    /// Shorthand for a [`CaptureError::CaptureFailed`].
    pub fn capture_failed(reason: CaptureFailure, detail: impl Into<String>) -> Self {
        CaptureError::CaptureFailed {
            reason,
            detail: detail.into(),
        }
    }

    /// Returns the failure reason code for capture failures.
    pub fn failure_reason(&self) -> Option<CaptureFailure> {
        match self {
            CaptureError::CaptureFailed { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use cropshot_core::error::{CaptureError, CaptureFailure};
    ///
    /// let error = CaptureError::capture_failed(CaptureFailure::WindowInvisible, "minimized");
    /// assert!(error.remediation_hint().contains("visible"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::WindowUnavailable { .. } => {
                "The window was closed or has no area. Select the window again before taking a \
                 capture."
            }
            CaptureError::CaptureFailed { reason, .. } => match reason {
                CaptureFailure::WindowInvisible => {
                    "Could not capture the selected window. Make sure it is visible (not \
                     minimized) and try again."
                }
                CaptureFailure::ResourceAcquisition => {
                    "The system ran out of drawing resources while capturing. Close some \
                     applications and try again."
                }
                CaptureFailure::NoBackend => {
                    "No screen capture backend is available on this platform. Run inside a \
                     desktop session (DISPLAY or WAYLAND_DISPLAY set on Linux)."
                }
                CaptureFailure::RenderRejected => {
                    "The window refused to render itself. Enable the region-grab fallback \
                     (CROPSHOT_REGION_FALLBACK=1) or bring the window to the front."
                }
                CaptureFailure::RegionGrabFailed => {
                    "The screen region could not be read. Check screen recording permissions \
                     and that the window is on an attached monitor."
                }
            },
            CaptureError::InvalidCrop { .. } => {
                "Draw a larger rectangle inside the captured image, or clear the crop to use the \
                 full capture."
            }
            CaptureError::EnumerationFailed { .. } => {
                "Could not list windows. Make sure a desktop session is running and the process \
                 is allowed to inspect other windows."
            }
            CaptureError::NoCapture => "Take a capture first.",
            CaptureError::NoWindowSelected => "Select a window first.",
            CaptureError::ImageError(_) => {
                "Image processing failed. Ensure the image data is valid and the requested \
                 operations are supported."
            }
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
            CaptureError::OcrFailed { .. } => {
                "Text recognition failed. Check that tesseract is installed and on PATH, and that \
                 the requested language data is present."
            }
        }
    }
}
