use std::ops::ControlFlow;

use rayon::prelude::*;

use crate::{
    assets::{
        raster::SourceRaster,
        sources::{CubeFaces, RingImages, SourceSet},
    },
    foundation::{
        core::{Canvas, Uv},
        error::{StitchError, StitchResult},
    },
    projection::{
        direction::direction_for_pixel,
        face::CubeFace,
        ring::ring_slot,
        sample::{Sample, sample_nearest},
        uv::face_uv,
    },
    render::{
        config::{RunConfig, Variant},
        output::OutputRaster,
    },
};

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_completed: u32,
    /// Output pixels that received a source sample.
    pub pixels_written: u64,
    /// Output pixels left at the background because their face or ring slot had no raster.
    pub pixels_absent: u64,
    /// Samples whose face UV fell outside `[0,1]` and had to be clamped.
    pub samples_clamped: u64,
}

impl RunStats {
    fn merged(self, other: Self) -> Self {
        Self {
            rows_completed: self.rows_completed + other.rows_completed,
            pixels_written: self.pixels_written + other.pixels_written,
            pixels_absent: self.pixels_absent + other.pixels_absent,
            samples_clamped: self.samples_clamped + other.samples_clamped,
        }
    }
}

/// Emitted after each row chunk; the only point where a run may be suspended or cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkCheckpoint {
    /// First row of the chunk just finished.
    pub start_row: u32,
    /// One past the last finished row.
    pub end_row: u32,
    pub total_rows: u32,
}

impl ChunkCheckpoint {
    pub fn fraction_done(&self) -> f64 {
        f64::from(self.end_row) / f64::from(self.total_rows)
    }

    pub fn is_last(&self) -> bool {
        self.end_row == self.total_rows
    }
}

/// Raster handed back when a run ends, either complete or cancelled.
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub raster: OutputRaster,
    pub stats: RunStats,
    /// `false` when the caller stopped the run before the last row.
    pub completed: bool,
}

/// Drives direction, face, UV and pixel lookup over every output pixel.
///
/// Construction checks the configuration and the source set; once built, a run cannot fail.
/// The engine reads only its config and the (immutable) sources, so any number of runs may be
/// started from one engine and all produce the same bytes.
#[derive(Debug)]
pub struct ProjectionEngine<'a> {
    config: RunConfig,
    canvas: Canvas,
    sources: &'a SourceSet,
}

impl<'a> ProjectionEngine<'a> {
    /// Validate `config` against `sources`.
    ///
    /// Fails with [`StitchError::InsufficientInput`] when required images are missing and with
    /// [`StitchError::Validation`] for bad configuration, a variant/source mismatch, or an
    /// empty raster.
    #[tracing::instrument(skip_all, fields(variant = sources.kind(), width = config.width, height = config.height))]
    pub fn new(config: RunConfig, sources: &'a SourceSet) -> StitchResult<Self> {
        let canvas = config.validate()?;

        match (&config.variant, sources) {
            (Variant::Cube { requirement }, SourceSet::Cube(faces)) => {
                check_cube(faces, requirement.required_faces())?;
            }
            (Variant::Ring { min_images }, SourceSet::Ring(ring)) => {
                check_ring(ring, *min_images)?;
            }
            (variant, sources) => {
                return Err(StitchError::validation(format!(
                    "configured variant {variant:?} does not match {} sources",
                    sources.kind()
                )));
            }
        }

        Ok(Self {
            config,
            canvas,
            sources,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Start a fresh run. Each call allocates a new output raster.
    pub fn run(&self) -> ProjectionRun<'_> {
        ProjectionRun {
            engine: self,
            output: OutputRaster::filled(self.canvas, self.config.background),
            next_row: 0,
            stats: RunStats::default(),
        }
    }

    /// Run to completion on the current thread.
    pub fn render(&self) -> RunOutcome {
        self.drive(|_| ControlFlow::Continue(()))
    }

    /// Run chunk by chunk, calling `on_chunk` at every checkpoint. Returning
    /// [`ControlFlow::Break`] cancels the run and hands back the partially filled raster.
    pub fn drive(
        &self,
        mut on_chunk: impl FnMut(&ChunkCheckpoint) -> ControlFlow<()>,
    ) -> RunOutcome {
        let mut run = self.run();
        for checkpoint in run.by_ref() {
            if on_chunk(&checkpoint).is_break() {
                tracing::info!(
                    rows_done = checkpoint.end_row,
                    rows_total = checkpoint.total_rows,
                    "projection run cancelled"
                );
                break;
            }
        }
        run.into_partial()
    }

    /// Render disjoint row chunks on a rayon pool. Output is byte-identical to [`render`].
    ///
    /// [`render`]: ProjectionEngine::render
    #[tracing::instrument(skip(self), fields(chunk_rows = self.config.effective_chunk_rows()))]
    pub fn render_parallel(&self, threads: Option<usize>) -> StitchResult<RunOutcome> {
        let pool = build_thread_pool(threads)?;
        let mut raster = OutputRaster::filled(self.canvas, self.config.background);
        let chunk_rows = self.config.effective_chunk_rows();
        let band_bytes = chunk_rows as usize * self.canvas.row_bytes();

        let stats = pool.install(|| {
            raster
                .data_mut()
                .par_chunks_mut(band_bytes)
                .enumerate()
                .map(|(band, bytes)| self.render_rows(band as u32 * chunk_rows, bytes))
                .reduce(RunStats::default, RunStats::merged)
        });

        log_finished(&stats);
        Ok(RunOutcome {
            raster,
            stats,
            completed: true,
        })
    }

    /// Sample for a single output pixel, with the source alpha untouched.
    ///
    /// Rendered runs write hits fully opaque; only pixels no source covers keep the background.
    pub fn sample_at(&self, x: u32, y: u32) -> Sample {
        self.project(x, y).0
    }

    /// Sample for output pixel `(x, y)`, plus whether its face UV needed clamping.
    fn project(&self, x: u32, y: u32) -> (Sample, bool) {
        match self.sources {
            SourceSet::Cube(faces) => {
                let dir = direction_for_pixel(x, y, self.canvas, self.config.latitude);
                let face = CubeFace::select(dir);
                let uv = face_uv(dir, face);
                (
                    sample_nearest(faces.get(face), uv),
                    !uv.is_inside_unit_square(),
                )
            }
            SourceSet::Ring(ring) => {
                let (index, local_u) = ring_slot(x, self.canvas.width, ring.len());
                // Rows span [0, 1) with no pole to reach; the latitude span only shapes cube runs.
                let v = f64::from(y) / f64::from(self.canvas.height);
                (sample_nearest(ring.get(index), Uv::new(local_u, v)), false)
            }
        }
    }

    /// Fill whole rows starting at `start_row`; `rows` holds a multiple of one row's bytes.
    fn render_rows(&self, start_row: u32, rows: &mut [u8]) -> RunStats {
        let mut stats = RunStats::default();
        for (i, row) in rows.chunks_exact_mut(self.canvas.row_bytes()).enumerate() {
            let y = start_row + i as u32;
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                match self.project(x as u32, y) {
                    (Sample::Hit(color), clamped) => {
                        px.copy_from_slice(&color.with_opaque_alpha().to_array());
                        stats.pixels_written += 1;
                        stats.samples_clamped += u64::from(clamped);
                    }
                    (Sample::Absent, _) => stats.pixels_absent += 1,
                }
            }
            stats.rows_completed += 1;
        }
        stats
    }
}

/// A run in progress: an iterator of [`ChunkCheckpoint`]s over an engine-owned raster.
///
/// Dropping the iterator early is a cancellation; [`ProjectionRun::into_partial`] recovers
/// whatever rows were finished.
pub struct ProjectionRun<'e> {
    engine: &'e ProjectionEngine<'e>,
    output: OutputRaster,
    next_row: u32,
    stats: RunStats,
}

impl ProjectionRun<'_> {
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn is_complete(&self) -> bool {
        self.next_row >= self.engine.canvas.height
    }

    /// Output as rendered so far.
    pub fn output(&self) -> &OutputRaster {
        &self.output
    }

    /// Render the remaining chunks and return the complete raster.
    pub fn finish(mut self) -> RunOutcome {
        self.by_ref().for_each(drop);
        self.into_partial()
    }

    /// Stop here and return the raster with only the finished rows written.
    pub fn into_partial(self) -> RunOutcome {
        let completed = self.is_complete();
        if completed {
            log_finished(&self.stats);
        }
        RunOutcome {
            raster: self.output,
            stats: self.stats,
            completed,
        }
    }
}

impl Iterator for ProjectionRun<'_> {
    type Item = ChunkCheckpoint;

    fn next(&mut self) -> Option<ChunkCheckpoint> {
        let total_rows = self.engine.canvas.height;
        if self.next_row >= total_rows {
            return None;
        }

        let start_row = self.next_row;
        let end_row = start_row
            .saturating_add(self.engine.config.effective_chunk_rows())
            .min(total_rows);
        let chunk_stats = self
            .engine
            .render_rows(start_row, self.output.rows_mut(start_row, end_row));
        self.stats = self.stats.merged(chunk_stats);
        self.next_row = end_row;

        tracing::debug!(start_row, end_row, total_rows, "row chunk done");
        Some(ChunkCheckpoint {
            start_row,
            end_row,
            total_rows,
        })
    }
}

fn check_cube(faces: &CubeFaces, required: &[CubeFace]) -> StitchResult<()> {
    let missing = faces.missing(required);
    if !missing.is_empty() {
        return Err(StitchError::insufficient_input(
            required.len(),
            required.len() - missing.len(),
            missing.iter().map(|f| f.name().to_string()).collect(),
        ));
    }
    for face in CubeFace::ALL.iter().filter(|f| !faces.contains(**f)) {
        tracing::warn!(face = face.name(), "optional face absent; its region stays background");
    }
    for (face, raster) in faces.iter_present() {
        check_non_empty(raster, face.name())?;
    }
    Ok(())
}

fn check_ring(ring: &RingImages, min_images: usize) -> StitchResult<()> {
    let supplied = ring.present_count();
    if supplied < min_images {
        let mut missing: Vec<String> = ring
            .missing_indices()
            .into_iter()
            .map(|i| format!("ring[{i}]"))
            .collect();
        if ring.len() < min_images {
            missing.push(format!("{} more slot(s)", min_images - ring.len()));
        }
        return Err(StitchError::insufficient_input(
            min_images, supplied, missing,
        ));
    }
    for index in ring.missing_indices() {
        tracing::warn!(index, "ring slot absent; its sector stays background");
    }
    for (index, raster) in ring.iter_present() {
        check_non_empty(raster, &format!("ring[{index}]"))?;
    }
    Ok(())
}

fn check_non_empty(raster: &dyn SourceRaster, label: &str) -> StitchResult<()> {
    if raster.width() == 0 || raster.height() == 0 {
        return Err(StitchError::validation(format!(
            "source '{label}' is empty ({}x{})",
            raster.width(),
            raster.height()
        )));
    }
    Ok(())
}

fn log_finished(stats: &RunStats) {
    tracing::info!(
        rows = stats.rows_completed,
        written = stats.pixels_written,
        absent = stats.pixels_absent,
        clamped = stats.samples_clamped,
        "projection run finished"
    );
}

fn build_thread_pool(threads: Option<usize>) -> StitchResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StitchError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StitchError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
