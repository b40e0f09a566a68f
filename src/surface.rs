use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::color::{self, Rgba};

/// Errors from pixel access and raster codec work.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Pixel access outside the surface. A caller bug, not a user-visible
    /// condition; algorithm layers bounds-check before touching pixels.
    #[error("pixel ({x}, {y}) is outside the {width}x{height} surface")]
    OutOfBounds { x: u32, y: u32, width: u32, height: u32 },
    #[error("raster codec error: {0}")]
    Codec(#[from] image::ImageError),
    #[error("pixel buffer does not match the surface dimensions")]
    MalformedBuffer,
}

/// An immutable full copy of a surface's pixel contents at one instant.
///
/// Snapshots are defensive copies, never views; mutating the source surface
/// afterwards cannot change them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// The mutable pixel buffer a drawing session edits.
///
/// Exactly one live surface exists per session. It is loaded from a frame's
/// encoded raster on frame switch and written back on each committed
/// operation; `set_pixel` is the sole mutation primitive underneath the
/// drawing tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// A surface filled with a solid background color.
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        assert!(width > 0 && height > 0, "surface dimensions must be positive");
        let mut pixels = vec![0u8; width as usize * height as usize * 4];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[background.r, background.g, background.b, background.a]);
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major. Read-only access for hosts that
    /// upload the surface to their own rendering target.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn bounds_check(&self, x: u32, y: u32) -> Result<(), SurfaceError> {
        if self.contains(x, y) {
            Ok(())
        } else {
            Err(SurfaceError::OutOfBounds { x, y, width: self.width, height: self.height })
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Result<Rgba, SurfaceError> {
        self.bounds_check(x, y)?;
        let i = self.offset(x, y);
        Ok(Rgba::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) -> Result<(), SurfaceError> {
        self.bounds_check(x, y)?;
        let i = self.offset(x, y);
        self.pixels[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        Ok(())
    }

    /// Clipped write used by the rasterizers; coordinates off the surface are
    /// discarded silently, matching canvas semantics.
    pub(crate) fn put_clipped(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        self.pixels[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Axis-aligned filled rectangle, clipped to the surface.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        let x0 = x.round() as i64;
        let y0 = y.round() as i64;
        let x1 = (x + w).round() as i64;
        let y1 = (y + h).round() as i64;
        for py in y0.min(y1)..y0.max(y1) {
            for px in x0.min(x1)..x0.max(x1) {
                self.put_clipped(px, py, color);
            }
        }
    }

    /// Defensive copy of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { width: self.width, height: self.height, pixels: self.pixels.clone() }
    }

    /// Overwrite all pixels from a snapshot of a same-dimension surface.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        assert!(
            snapshot.width == self.width && snapshot.height == self.height,
            "snapshot dimensions do not match the surface"
        );
        self.pixels.copy_from_slice(&snapshot.pixels);
    }

    /// Blend `overlay` over this surface, with the overlay's alpha scaled by
    /// `alpha_factor`.
    pub fn blend_over(&mut self, overlay: &RasterSurface, alpha_factor: f32) {
        assert!(
            overlay.width == self.width && overlay.height == self.height,
            "overlay dimensions do not match the surface"
        );
        for i in (0..self.pixels.len()).step_by(4) {
            let dst = Rgba::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]);
            let src = Rgba::new(overlay.pixels[i], overlay.pixels[i + 1], overlay.pixels[i + 2], overlay.pixels[i + 3]);
            let out = color::over(dst, src, alpha_factor);
            self.pixels[i..i + 4].copy_from_slice(&[out.r, out.g, out.b, out.a]);
        }
    }

    /// Encode the surface as PNG. The round trip through `decode` is lossless
    /// for this engine's RGBA8 format.
    pub fn encode(&self) -> Result<Vec<u8>, SurfaceError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(SurfaceError::MalformedBuffer)?;
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }

    /// Decode a surface from bytes produced by `encode` (or any PNG with the
    /// same dimensions as the project's frames).
    pub fn decode(bytes: &[u8]) -> Result<Self, SurfaceError> {
        let image = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SurfaceError::MalformedBuffer);
        }
        Ok(Self { width, height, pixels: image.into_raw() })
    }

    /// Reduced-resolution PNG of the surface, for frame strips and pickers.
    pub fn thumbnail(&self, width: u32, height: u32) -> Result<Vec<u8>, SurfaceError> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or(SurfaceError::MalformedBuffer)?;
        let small = imageops::resize(&image, width, height, FilterType::Triangle);
        let mut out = Cursor::new(Vec::new());
        small.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}
