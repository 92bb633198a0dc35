//! Windows GDI capture path
//!
//! Renders a window into an offscreen bitmap with `PrintWindow`, which works
//! for occluded windows and, with `PW_RENDERFULLCONTENT`, for most
//! DirectComposition surfaces (browsers, UWP apps).
//!
//! # Resource handling
//!
//! Every GDI object is wrapped in a guard whose `Drop` releases it. Guards
//! are declared in acquisition order, so Rust drops them in strict reverse:
//!
//! 1. [`WindowDc`] (`GetWindowDC` / `ReleaseDC`)
//! 2. [`MemoryDc`] (`CreateCompatibleDC` / `DeleteDC`)
//! 3. [`GdiBitmap`] (`CreateCompatibleBitmap` / `DeleteObject`)
//! 4. [`Selection`] (`SelectObject` / restore previous object)
//!
//! The selection is dropped early, before `GetDIBits`, because the bitmap
//! must not be selected into a DC while it is read.

use std::{ffi::c_void, mem, time::Instant};

use windows_sys::Win32::{
    Foundation::{HWND, RECT},
    Graphics::Gdi::{
        BI_RGB, BITMAPINFO, BITMAPINFOHEADER, CreateCompatibleBitmap, CreateCompatibleDC,
        DIB_RGB_COLORS, DeleteDC, DeleteObject, GetDIBits, GetWindowDC, HBITMAP, HDC, HGDIOBJ,
        ReleaseDC, SelectObject,
    },
    Storage::Xps::PrintWindow,
    UI::WindowsAndMessaging::{GetWindowRect, IsIconic, IsWindow, IsWindowVisible},
};

use super::{CapturedImage, NativeWindowCapture, RenderMode, RenderOutcome, WindowRegionSource};
use crate::{
    error::{CaptureError, CaptureFailure, CaptureResult},
    model::{NativeWindowId, ResolvedWindow, ScreenRect, WindowHandle},
};

type BOOL = i32;
const FALSE: BOOL = 0;

/// `SelectObject` failure sentinel.
const HGDI_ERROR: isize = -1;

fn resource_failure(call: &str) -> CaptureError {
    let os = std::io::Error::last_os_error();
    tracing::error!(call, error = %os, "GDI resource acquisition failed");
    CaptureError::capture_failed(
        CaptureFailure::ResourceAcquisition,
        format!("{} failed: {}", call, os),
    )
}

// ============================================================================
// RAII guards
// ============================================================================

/// Device context of the whole window, including the non-client area.
struct WindowDc {
    hwnd: HWND,
    hdc:  HDC,
}

impl WindowDc {
    fn acquire(hwnd: HWND) -> CaptureResult<Self> {
        // SAFETY: GetWindowDC accepts any HWND and returns null on failure.
        let hdc = unsafe { GetWindowDC(hwnd) };
        if hdc.is_null() {
            return Err(resource_failure("GetWindowDC"));
        }
        Ok(Self { hwnd, hdc })
    }
}

impl Drop for WindowDc {
    fn drop(&mut self) {
        // SAFETY: hdc was obtained from GetWindowDC for this hwnd.
        unsafe {
            ReleaseDC(self.hwnd, self.hdc);
        }
    }
}

struct MemoryDc(HDC);

impl MemoryDc {
    fn compatible_with(window: &WindowDc) -> CaptureResult<Self> {
        // SAFETY: window.hdc is a live DC for the lifetime of `window`.
        let hdc = unsafe { CreateCompatibleDC(window.hdc) };
        if hdc.is_null() {
            return Err(resource_failure("CreateCompatibleDC"));
        }
        Ok(Self(hdc))
    }
}

impl Drop for MemoryDc {
    fn drop(&mut self) {
        // SAFETY: created by CreateCompatibleDC and owned by this guard.
        unsafe {
            DeleteDC(self.0);
        }
    }
}

struct GdiBitmap(HBITMAP);

impl GdiBitmap {
    fn compatible_with(window: &WindowDc, width: i32, height: i32) -> CaptureResult<Self> {
        // SAFETY: window.hdc is live; width and height are positive.
        let bitmap = unsafe { CreateCompatibleBitmap(window.hdc, width, height) };
        if bitmap.is_null() {
            return Err(resource_failure("CreateCompatibleBitmap"));
        }
        Ok(Self(bitmap))
    }
}

impl Drop for GdiBitmap {
    fn drop(&mut self) {
        // SAFETY: the bitmap is deselected before this guard drops.
        unsafe {
            DeleteObject(self.0 as HGDIOBJ);
        }
    }
}

/// Bitmap selected into a memory DC; restores the previous object on drop.
struct Selection<'a> {
    dc:       &'a MemoryDc,
    previous: HGDIOBJ,
}

impl<'a> Selection<'a> {
    fn select(dc: &'a MemoryDc, bitmap: &GdiBitmap) -> CaptureResult<Self> {
        // SAFETY: both handles are live and owned by guards that outlive this one.
        let previous = unsafe { SelectObject(dc.0, bitmap.0 as HGDIOBJ) };
        if previous.is_null() || previous as isize == HGDI_ERROR {
            return Err(resource_failure("SelectObject"));
        }
        Ok(Self { dc, previous })
    }
}

impl Drop for Selection<'_> {
    fn drop(&mut self) {
        // SAFETY: restores the object that was selected before us.
        unsafe {
            SelectObject(self.dc.0, self.previous);
        }
    }
}

// ============================================================================
// Native capture
// ============================================================================

/// [`NativeWindowCapture`] using `PrintWindow` into a compatible bitmap.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdiWindowCapture;

impl GdiWindowCapture {
    pub fn new() -> Self {
        Self
    }

    /// Reads a deselected bitmap as top-down 32-bit BGRX.
    fn read_pixels(dc: &MemoryDc, bitmap: &GdiBitmap, width: i32, height: i32) -> CaptureResult<Vec<u8>> {
        // SAFETY: BITMAPINFO is plain data; all-zero is a valid starting value.
        let mut info: BITMAPINFO = unsafe { mem::zeroed() };
        info.bmiHeader.biSize = mem::size_of::<BITMAPINFOHEADER>() as u32;
        info.bmiHeader.biWidth = width;
        info.bmiHeader.biHeight = -height; // top-down rows
        info.bmiHeader.biPlanes = 1;
        info.bmiHeader.biBitCount = 32;
        info.bmiHeader.biCompression = BI_RGB as _;

        let mut buffer = vec![0u8; width as usize * height as usize * 4];

        // SAFETY: buffer holds exactly width*height 32-bit pixels as described
        // by `info`, and the bitmap is not selected into any DC.
        let lines = unsafe {
            GetDIBits(
                dc.0,
                bitmap.0,
                0,
                height as u32,
                buffer.as_mut_ptr() as *mut c_void,
                &mut info,
                DIB_RGB_COLORS,
            )
        };

        if lines != height {
            return Err(resource_failure("GetDIBits"));
        }

        Ok(buffer)
    }
}

impl NativeWindowCapture for GdiWindowCapture {
    #[tracing::instrument(skip(self), fields(hwnd = format_args!("{:#x}", native)))]
    fn render(
        &self,
        native: NativeWindowId,
        rect: ScreenRect,
        mode: RenderMode,
    ) -> CaptureResult<RenderOutcome> {
        if !rect.has_area() {
            return Err(CaptureError::capture_failed(
                CaptureFailure::ResourceAcquisition,
                format!("cannot allocate a {}x{} bitmap", rect.width, rect.height),
            ));
        }

        let start = Instant::now();
        let hwnd = native as HWND;

        let window_dc = WindowDc::acquire(hwnd)?;
        let memory_dc = MemoryDc::compatible_with(&window_dc)?;
        let bitmap = GdiBitmap::compatible_with(&window_dc, rect.width, rect.height)?;
        let selection = Selection::select(&memory_dc, &bitmap)?;

        // SAFETY: hwnd was validated by GetWindowDC; memory_dc has the bitmap selected.
        let printed = unsafe { PrintWindow(hwnd, memory_dc.0, mode.flags()) };
        drop(selection);

        if printed == FALSE {
            tracing::debug!(?mode, "PrintWindow returned 0");
            return Ok(RenderOutcome::Rejected);
        }

        let pixels = Self::read_pixels(&memory_dc, &bitmap, rect.width, rect.height)?;
        let image = CapturedImage::from_bgrx(rect.width as u32, rect.height as u32, &pixels)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            ?mode,
            "PrintWindow rendered"
        );

        Ok(RenderOutcome::Rendered(image))
    }
}

// ============================================================================
// Live bounds
// ============================================================================

/// [`WindowRegionSource`] reading bounds straight from user32.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32WindowSource;

impl Win32WindowSource {
    pub fn new() -> Self {
        Self
    }

    fn native_of(handle: &WindowHandle) -> Option<NativeWindowId> {
        handle.native.or_else(|| handle.id.parse().ok())
    }
}

impl WindowRegionSource for Win32WindowSource {
    #[tracing::instrument(skip(self, handle), fields(id = %handle.id))]
    fn refresh(&self, handle: &WindowHandle) -> CaptureResult<Option<ResolvedWindow>> {
        let Some(native) = Self::native_of(handle) else {
            return Ok(None);
        };
        let hwnd = native as HWND;

        // SAFETY: IsWindow accepts arbitrary values.
        if unsafe { IsWindow(hwnd) } == FALSE {
            return Ok(None);
        }

        let mut rect = RECT {
            left:   0,
            top:    0,
            right:  0,
            bottom: 0,
        };
        // SAFETY: hwnd is a live window and rect is a valid out pointer.
        if unsafe { GetWindowRect(hwnd, &mut rect) } == FALSE {
            // Destroyed between the two calls
            return Ok(None);
        }

        // SAFETY: hwnd checked above; both calls are read-only queries.
        let visible =
            unsafe { IsWindowVisible(hwnd) != FALSE && IsIconic(hwnd) == FALSE };

        let rect = ScreenRect::from_edges(rect.left, rect.top, rect.right, rect.bottom);
        tracing::debug!(?rect, visible, "Refreshed window bounds");

        Ok(Some(ResolvedWindow { rect, visible }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_invalid_hwnd_is_gone() {
        let handle = WindowHandle::new("0", "ghost", ScreenRect::new(0, 0, 10, 10))
            .with_native(0xdead_beef);
        assert_eq!(Win32WindowSource::new().refresh(&handle).unwrap(), None);
    }

    #[test]
    fn test_refresh_unparseable_id_is_gone() {
        let handle = WindowHandle::new("abc", "ghost", ScreenRect::new(0, 0, 10, 10));
        assert_eq!(Win32WindowSource::new().refresh(&handle).unwrap(), None);
    }

    #[test]
    fn test_render_empty_rect_is_resource_failure() {
        let err = GdiWindowCapture::new()
            .render(1, ScreenRect::new(0, 0, 0, 0), RenderMode::FullContent)
            .unwrap_err();
        assert_eq!(err.failure_reason(), Some(CaptureFailure::ResourceAcquisition));
    }
}
