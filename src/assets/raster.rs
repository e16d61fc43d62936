use std::sync::Arc;

use crate::foundation::{
    core::Rgba8,
    error::{StitchError, StitchResult},
};

/// Read-only pixel access to a decoded source image.
///
/// Implementations must be cheap to share across worker threads; the engine never writes
/// through this trait and only reads inside `0..width() x 0..height()`.
pub trait SourceRaster: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Pixel at `(x, y)`. Callers guarantee the coordinate is in bounds.
    fn pixel(&self, x: u32, y: u32) -> Rgba8;
}

/// Owned straight-alpha RGBA8 source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Wrap row-major RGBA8 bytes. `rgba8.len()` must equal `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> StitchResult<Self> {
        if width == 0 || height == 0 {
            return Err(StitchError::validation(format!(
                "source image must be non-empty (got {width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if rgba8.len() != expected {
            return Err(StitchError::validation(format!(
                "source image {width}x{height} needs {expected} bytes, got {}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Image filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgba8) -> StitchResult<Self> {
        let count = width as usize * height as usize;
        let data = color.to_array().repeat(count);
        Self::new(width, height, data)
    }

    /// Build an image by evaluating `f` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> Rgba8,
    ) -> StitchResult<Self> {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y).to_array());
            }
        }
        Self::new(width, height, data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba8
    }
}

impl SourceRaster for SourceImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Rgba8::from_slice(&self.rgba8[idx..idx + 4])
    }
}

impl SourceRaster for image::RgbaImage {
    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let [r, g, b, a] = self.get_pixel(x, y).0;
        Rgba8::new(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
