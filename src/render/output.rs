use crate::foundation::{
    core::{Canvas, Rgba8},
    error::{StitchError, StitchResult},
};

/// Equirectangular output buffer: row-major straight-alpha RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl OutputRaster {
    pub(crate) fn filled(canvas: Canvas, background: Rgba8) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: background.to_array().repeat(canvas.pixel_count()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, or `None` outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some(Rgba8::from_slice(&self.data[idx..idx + 4]))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn into_rgba_image(self) -> StitchResult<image::RgbaImage> {
        let (w, h) = (self.width, self.height);
        image::RgbaImage::from_raw(w, h, self.data).ok_or_else(|| {
            StitchError::validation(format!("output buffer does not match {w}x{h} RGBA8"))
        })
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of rows `start..end`.
    pub(crate) fn rows_mut(&mut self, start: u32, end: u32) -> &mut [u8] {
        let row_bytes = self.canvas().row_bytes();
        &mut self.data[start as usize * row_bytes..end as usize * row_bytes]
    }
}
