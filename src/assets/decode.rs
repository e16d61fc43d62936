use std::path::Path;

use anyhow::Context;

use crate::{
    assets::raster::{SourceImage, SourceRaster},
    foundation::error::StitchResult,
};

/// Decode encoded image bytes (PNG, JPEG, ...) into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> StitchResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    SourceImage::new(width, height, rgba.into_raw())
}

/// Read and decode an image file.
#[tracing::instrument(level = "debug")]
pub fn load_image(path: &Path) -> StitchResult<SourceImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let img = decode_image(&bytes).with_context(|| format!("decode '{}'", path.display()))?;
    tracing::debug!(width = img.width(), height = img.height(), "loaded source image");
    Ok(img)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
