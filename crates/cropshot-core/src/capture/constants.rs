//! Tunable constants for capture and crop selection.
//!
//! # Runtime Configuration
//!
//! | Environment Variable | Default | Description |
//! |---------------------|---------|-------------|
//! | `CROPSHOT_MIN_CROP_PX` | 10 | Minimum crop side in original-image pixels |
//! | `CROPSHOT_REGION_FALLBACK` | on | Wire the screen-region grab behind the native path |

/// Minimum width and height of a committed crop, in original-image pixels.
///
/// Drags smaller than this on either axis are treated as accidental clicks
/// and discarded.
pub const MIN_CROP_SIZE_PX: u32 = 10;

/// `PrintWindow` flag asking DWM to include DirectComposition content.
///
/// Not exported by every SDK header revision, so it is spelled out here.
pub const PW_RENDERFULLCONTENT: u32 = 0x0000_0002;

/// Region-grab fallback default.
pub const REGION_FALLBACK_DEFAULT: bool = true;

pub const MIN_CROP_ENV: &str = "CROPSHOT_MIN_CROP_PX";
pub const REGION_FALLBACK_ENV: &str = "CROPSHOT_REGION_FALLBACK";

// =============================================================================
// Environment Variable Overrides
// =============================================================================

fn get_u32_from_env(env_var: &str, default: u32) -> u32 {
    std::env::var(env_var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn get_flag_from_env(env_var: &str, default: bool) -> bool {
    match std::env::var(env_var) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "0" | "false" | "off" | "no" => false,
            "1" | "true" | "on" | "yes" => true,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Minimum crop side, checking the environment override.
///
/// Override with: `CROPSHOT_MIN_CROP_PX`. Zero is raised to 1 so a committed
/// crop is never empty.
pub fn min_crop_size_px() -> u32 {
    get_u32_from_env(MIN_CROP_ENV, MIN_CROP_SIZE_PX).max(1)
}

/// Whether the default engine gets a region-grab fallback.
///
/// Override with: `CROPSHOT_REGION_FALLBACK=0`
pub fn region_fallback_enabled() -> bool {
    get_flag_from_env(REGION_FALLBACK_ENV, REGION_FALLBACK_DEFAULT)
}
