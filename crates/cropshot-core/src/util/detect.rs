//! Runtime platform detection
//!
//! Decides once, at engine construction, which capture capabilities the
//! current desktop can offer.

use std::env;

use crate::model::{BackendType, PlatformInfo};

/// Detects the operating system and display backend.
///
/// On Linux a non-empty `WAYLAND_DISPLAY` wins over `DISPLAY`; with neither
/// set there is no desktop to capture and the backend is
/// [`BackendType::None`]. Windows and macOS always report their native
/// backend.
///
/// # Examples
///
/// ```
/// use cropshot_core::util::detect::detect_platform;
///
/// let platform = detect_platform();
/// assert!(!platform.os.is_empty());
/// ```
pub fn detect_platform() -> PlatformInfo {
    detect_platform_with_env(|key| env::var(key).ok())
}

fn detect_platform_with_env<F>(_lookup: F) -> PlatformInfo
where
    F: Fn(&str) -> Option<String>,
{
    #[cfg(target_os = "linux")]
    {
        PlatformInfo::new("linux".to_string(), detect_linux_backend(&_lookup))
    }

    #[cfg(target_os = "windows")]
    {
        PlatformInfo::new("windows".to_string(), BackendType::Windows)
    }

    #[cfg(target_os = "macos")]
    {
        PlatformInfo::new("macos".to_string(), BackendType::MacOS)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        PlatformInfo::new("unknown".to_string(), BackendType::None)
    }
}

#[cfg(target_os = "linux")]
fn detect_linux_backend<F>(lookup: &F) -> BackendType
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

    if is_set("WAYLAND_DISPLAY") {
        BackendType::Wayland
    } else if is_set("DISPLAY") {
        BackendType::X11
    } else {
        BackendType::None
    }
}
