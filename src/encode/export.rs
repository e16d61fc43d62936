use std::path::Path;

use anyhow::Context;
use image::ImageEncoder as _;

use crate::{
    foundation::{
        error::{StitchError, StitchResult},
        math::mul_div255,
    },
    render::output::OutputRaster,
};

/// JPEG quality used when none is given.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Encoded file format for a finished panorama.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ExportFormat {
    /// Lossless, keeps alpha.
    Png,
    /// Lossy; alpha is flattened over black.
    Jpeg { quality: u8 },
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Jpeg {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg { .. } => "jpg",
        }
    }

    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::default()),
            _ => None,
        }
    }
}

/// Encode `raster` into `format` bytes.
pub fn encode_raster(raster: &OutputRaster, format: ExportFormat) -> StitchResult<Vec<u8>> {
    let (w, h) = (raster.width(), raster.height());
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut buf)
                .write_image(raster.as_bytes(), w, h, image::ExtendedColorType::Rgba8)
                .context("encode png")?;
        }
        ExportFormat::Jpeg { quality } => {
            if !(1..=100).contains(&quality) {
                return Err(StitchError::validation(format!(
                    "jpeg quality must be in 1..=100 (got {quality})"
                )));
            }
            let rgb = flatten_to_rgb8(raster.as_bytes(), [0, 0, 0]);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
                .write_image(&rgb, w, h, image::ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
    }
    Ok(buf)
}

/// Encode `raster` and write it to `path`, creating parent directories.
#[tracing::instrument(skip(raster), fields(width = raster.width(), height = raster.height()))]
pub fn write_raster(raster: &OutputRaster, path: &Path, format: ExportFormat) -> StitchResult<()> {
    let bytes = encode_raster(raster, format)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, &bytes).with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!(bytes = bytes.len(), "wrote panorama");
    Ok(())
}

/// `360-panorama-YYYY-MM-DDTHH-MM-SS.<ext>` for the given UTC instant.
pub fn default_output_name(format: ExportFormat, now: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "360-panorama-{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// Composite straight-alpha RGBA8 over an opaque `bg` and drop the alpha channel.
fn flatten_to_rgb8(src: &[u8], bg: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / 4 * 3);
    for s in src.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = mul_div255(u16::from(s[c]), a) + mul_div255(u16::from(bg[c]), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
