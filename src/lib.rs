//! panostitch turns flat views of a scene into one equirectangular panorama.
//!
//! Two source layouts are supported:
//!
//! - **Cube**: six axis-aligned faces. Each output pixel becomes a direction on the unit
//!   sphere, the dominant axis picks a face, and a gnomonic projection finds the spot on that
//!   face's image.
//! - **Ring**: N photos evenly spaced around 360 degrees of yaw. Columns are partitioned by
//!   angle; no 3-D math is involved.
//!
//! # Pipeline
//!
//! 1. **Prepare**: decode sources ([`load_image`], [`decode_image`]) into a [`SourceSet`].
//! 2. **Validate**: [`ProjectionEngine::new`] checks the [`RunConfig`] and refuses to start with
//!    [`StitchError::InsufficientInput`] when required images are missing.
//! 3. **Render**: drive a [`ProjectionRun`] chunk by chunk, or call
//!    [`ProjectionEngine::render`] / [`ProjectionEngine::render_parallel`].
//! 4. **Export** (optional): [`write_raster`] as PNG or JPEG.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: chunk size, cancellation points and thread count never change pixels.
//! - **No IO in the engine**: everything is decoded and resident before a run starts.
//! - **Nearest-neighbour only**: each output pixel copies exactly one source pixel.
#![forbid(unsafe_code)]

mod assets;
mod encode;
mod foundation;
mod projection;
mod render;

pub use assets::decode::{decode_image, load_image};
pub use assets::raster::{SourceImage, SourceRaster};
pub use assets::sources::{CubeFaces, RingImages, SharedRaster, SourceSet};
pub use encode::export::{
    DEFAULT_JPEG_QUALITY, ExportFormat, default_output_name, encode_raster, write_raster,
};
pub use foundation::core::{Canvas, DVec3, Direction, Rgba8, Uv};
pub use foundation::error::{StitchError, StitchResult};
pub use projection::direction::{LatitudeSpan, direction_for_pixel, direction_from_angles};
pub use projection::face::CubeFace;
pub use projection::ring::ring_slot;
pub use projection::sample::{Sample, sample_nearest, texel_index};
pub use projection::uv::{face_direction, face_uv};
pub use render::config::{
    CubeRequirement, DEFAULT_CHUNK_ROWS, MIN_RING_IMAGES, RunConfig, Variant,
};
pub use render::engine::{
    ChunkCheckpoint, ProjectionEngine, ProjectionRun, RunOutcome, RunStats,
};
pub use render::output::OutputRaster;
