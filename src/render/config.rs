use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::{StitchError, StitchResult},
    },
    projection::{direction::LatitudeSpan, face::CubeFace},
};

/// Smallest ring the engine accepts.
pub const MIN_RING_IMAGES: usize = 4;

/// Rows rendered between checkpoints unless configured otherwise.
pub const DEFAULT_CHUNK_ROWS: u32 = 50;

/// Which cube faces must be present before a run may start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeRequirement {
    /// Full cubemap.
    #[default]
    AllSix,
    /// Front/back/left/right; top and bottom are optional and render as background if absent.
    SidesOnly,
}

impl CubeRequirement {
    pub fn required_faces(self) -> &'static [CubeFace] {
        match self {
            Self::AllSix => &CubeFace::ALL,
            Self::SidesOnly => &CubeFace::SIDES,
        }
    }
}

/// Projection variant for a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variant {
    /// Six axis-aligned faces, gnomonic per-face lookup.
    Cube {
        #[serde(default)]
        requirement: CubeRequirement,
    },
    /// N images evenly spaced in yaw, pure angular partition.
    Ring {
        #[serde(default = "default_min_images")]
        min_images: usize,
    },
}

fn default_min_images() -> usize {
    MIN_RING_IMAGES
}

impl Default for Variant {
    fn default() -> Self {
        Self::Cube {
            requirement: CubeRequirement::AllSix,
        }
    }
}

/// Immutable configuration for one projection run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub variant: Variant,
    /// Rows per checkpoint; 0 is treated as 1.
    pub chunk_rows: u32,
    pub latitude: LatitudeSpan,
    /// Value of output pixels no source covers.
    pub background: Rgba8,
    /// Require the conventional 2:1 equirectangular aspect.
    pub strict_aspect: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 4096,
            height: 2048,
            variant: Variant::default(),
            chunk_rows: DEFAULT_CHUNK_ROWS,
            latitude: LatitudeSpan::default(),
            background: Rgba8::TRANSPARENT,
            strict_aspect: true,
        }
    }
}

impl RunConfig {
    /// 2:1 panorama `width` pixels wide.
    pub fn equirect(width: u32) -> Self {
        Self {
            width,
            height: width / 2,
            ..Self::default()
        }
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_chunk_rows(mut self, chunk_rows: u32) -> Self {
        self.chunk_rows = chunk_rows;
        self
    }

    pub fn with_latitude(mut self, latitude: LatitudeSpan) -> Self {
        self.latitude = latitude;
        self
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn with_strict_aspect(mut self, strict_aspect: bool) -> Self {
        self.strict_aspect = strict_aspect;
        self
    }

    pub fn effective_chunk_rows(&self) -> u32 {
        self.chunk_rows.max(1)
    }

    /// Check the configuration and return the output canvas it describes.
    pub fn validate(&self) -> StitchResult<Canvas> {
        let canvas = Canvas::new(self.width, self.height)?;
        if self.strict_aspect && !canvas.is_two_to_one() {
            return Err(StitchError::validation(format!(
                "equirectangular output must be 2:1 (got {}x{}); disable strict_aspect to allow other ratios",
                self.width, self.height
            )));
        }
        if let Variant::Ring { min_images } = self.variant
            && min_images < MIN_RING_IMAGES
        {
            return Err(StitchError::validation(format!(
                "ring min_images must be >= {MIN_RING_IMAGES} (got {min_images})"
            )));
        }
        Ok(canvas)
    }

    pub fn from_json_str(json: &str) -> StitchResult<Self> {
        serde_json::from_str(json).map_err(|e| StitchError::serde(e.to_string()))
    }

    pub fn from_json_path(path: &Path) -> StitchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read run config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> StitchResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StitchError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
