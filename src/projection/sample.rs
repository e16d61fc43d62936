use crate::{
    assets::raster::SourceRaster,
    foundation::core::{Rgba8, Uv},
};

/// Result of a nearest-neighbour lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    Hit(Rgba8),
    /// No raster is bound to the addressed face or ring slot.
    Absent,
}

impl Sample {
    pub fn pixel(self) -> Option<Rgba8> {
        match self {
            Self::Hit(px) => Some(px),
            Self::Absent => None,
        }
    }
}

/// Pixel index for normalized coordinate `t` along an axis `extent` pixels long.
///
/// `floor(t * (extent - 1))` clamped into `0..extent`; NaN maps to 0.
pub fn texel_index(t: f64, extent: u32) -> u32 {
    let max = f64::from(extent.saturating_sub(1));
    // `as` saturates and sends NaN to 0.
    (t * max).floor().clamp(0.0, max) as u32
}

/// Nearest-neighbour lookup of `uv` in `raster`. No interpolation.
pub fn sample_nearest(raster: Option<&dyn SourceRaster>, uv: Uv) -> Sample {
    let Some(raster) = raster else {
        return Sample::Absent;
    };
    let (w, h) = (raster.width(), raster.height());
    if w == 0 || h == 0 {
        return Sample::Absent;
    }
    Sample::Hit(raster.pixel(texel_index(uv.u, w), texel_index(uv.v, h)))
}

#[cfg(test)]
#[path = "../../tests/unit/projection/sample.rs"]
mod tests;
