use crate::foundation::error::{StitchError, StitchResult};

pub use glam::DVec3;

/// Straight-alpha RGBA8 pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// First four bytes of `px`; callers pass exact RGBA8 slices.
    pub(crate) fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    /// Same color with alpha forced to 255.
    pub const fn with_opaque_alpha(self) -> Self {
        Self::opaque(self.r, self.g, self.b)
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Output raster dimensions, fixed for the duration of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> StitchResult<Self> {
        if width == 0 || height == 0 {
            return Err(StitchError::validation(format!(
                "canvas dimensions must be non-zero (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn row_bytes(self) -> usize {
        self.width as usize * 4
    }

    pub fn is_two_to_one(self) -> bool {
        u64::from(self.width) == u64::from(self.height) * 2
    }
}

/// Face-local texture coordinate; in `[0,1]x[0,1]` up to rounding.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn is_inside_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.u) && (0.0..=1.0).contains(&self.v)
    }
}

/// Unit viewing direction in a right-handed, sphere-centred frame (+Y up).
///
/// Never re-normalized by the engine: the gnomonic formulas assume unit input.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Direction(pub DVec3);

impl Direction {
    pub const UP: Self = Self(DVec3::Y);
    pub const DOWN: Self = Self(DVec3::NEG_Y);

    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self(DVec3::new(dx, dy, dz))
    }

    pub fn dx(self) -> f64 {
        self.0.x
    }

    pub fn dy(self) -> f64 {
        self.0.y
    }

    pub fn dz(self) -> f64 {
        self.0.z
    }

    pub fn length(self) -> f64 {
        self.0.length()
    }
}

impl From<DVec3> for Direction {
    fn from(v: DVec3) -> Self {
        Self(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
