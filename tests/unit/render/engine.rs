use std::sync::Arc;

use super::*;
use crate::{
    assets::raster::SourceImage,
    foundation::core::Rgba8,
    projection::{direction::LatitudeSpan, sample::texel_index},
    render::config::CubeRequirement,
};

const RED: Rgba8 = Rgba8::opaque(255, 0, 0);
const GREEN: Rgba8 = Rgba8::opaque(0, 255, 0);
const BLUE: Rgba8 = Rgba8::opaque(0, 0, 255);
const YELLOW: Rgba8 = Rgba8::opaque(255, 255, 0);

fn solid(color: Rgba8) -> SourceImage {
    SourceImage::solid(2, 2, color).unwrap()
}

fn colored_cube() -> CubeFaces {
    CubeFaces::new()
        .with(CubeFace::Front, solid(RED))
        .with(CubeFace::Back, solid(GREEN))
        .with(CubeFace::Left, solid(BLUE))
        .with(CubeFace::Right, solid(YELLOW))
        .with(CubeFace::Top, solid(Rgba8::WHITE))
        .with(CubeFace::Bottom, solid(Rgba8::BLACK))
}

fn checker_cube(size: u32) -> CubeFaces {
    let mut faces = CubeFaces::new();
    for face in CubeFace::ALL {
        let k = face.index() as u8;
        let img = SourceImage::from_fn(size, size, |x, y| {
            Rgba8::opaque(k * 40, (x * 7 + y) as u8, ((x ^ y) * 13) as u8)
        })
        .unwrap();
        faces.insert(face, Arc::new(img));
    }
    faces
}

fn ring_of(n: usize, width: u32) -> RingImages {
    RingImages::new(
        (0..n)
            .map(|i| {
                let img = SourceImage::from_fn(width, 10, move |x, y| {
                    Rgba8::opaque(i as u8, x as u8, y as u8)
                })
                .unwrap();
                Arc::new(img) as Arc<dyn SourceRaster>
            })
            .collect(),
    )
}

#[test]
fn full_cube_fills_poles_and_horizon() {
    let sources = SourceSet::Cube(colored_cube());
    let engine = ProjectionEngine::new(RunConfig::equirect(8), &sources).unwrap();
    let out = engine.render();
    assert!(out.completed);
    assert_eq!(out.stats.rows_completed, 4);
    assert_eq!(out.stats.pixels_written, 32);
    assert_eq!(out.stats.pixels_absent, 0);

    for x in 0..8 {
        assert_eq!(out.raster.pixel(x, 0), Some(Rgba8::WHITE));
        assert_eq!(out.raster.pixel(x, 3), Some(Rgba8::BLACK));
    }
    for y in [1, 2] {
        assert_eq!(out.raster.pixel(0, y), Some(GREEN));
        assert_eq!(out.raster.pixel(2, y), Some(YELLOW));
        assert_eq!(out.raster.pixel(4, y), Some(RED));
        assert_eq!(out.raster.pixel(6, y), Some(BLUE));
    }
}

#[test]
fn half_open_rows_match_classic_browser_layout() {
    let sources = SourceSet::Cube(colored_cube());
    let cfg = RunConfig::equirect(8).with_latitude(LatitudeSpan::HalfOpen);
    let out = ProjectionEngine::new(cfg, &sources).unwrap().render();
    assert_eq!(out.raster.pixel(0, 0), Some(Rgba8::WHITE));
    // phi = 3pi/4 at x = 0: |dz| edges out |dy| by one ulp.
    assert_eq!(out.raster.pixel(0, 3), Some(GREEN));
    assert_eq!(out.raster.pixel(1, 3), Some(Rgba8::BLACK));
}

#[test]
fn missing_required_face_refuses_to_start() {
    let mut faces = colored_cube();
    faces.remove(CubeFace::Bottom);
    let sources = SourceSet::Cube(faces);
    let err = ProjectionEngine::new(RunConfig::equirect(8), &sources).unwrap_err();
    match err {
        StitchError::InsufficientInput {
            required,
            supplied,
            missing,
        } => {
            assert_eq!((required, supplied), (6, 5));
            assert_eq!(missing, vec!["bottom".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sides_only_leaves_absent_poles_at_background() {
    let mut faces = colored_cube();
    faces.remove(CubeFace::Top);
    faces.remove(CubeFace::Bottom);
    let sources = SourceSet::Cube(faces);
    let bg = Rgba8::new(1, 2, 3, 0);
    let cfg = RunConfig::equirect(8)
        .with_variant(Variant::Cube {
            requirement: CubeRequirement::SidesOnly,
        })
        .with_background(bg);
    let out = ProjectionEngine::new(cfg, &sources).unwrap().render();

    assert!(out.completed);
    assert_eq!(out.raster.pixel(3, 0), Some(bg));
    assert_eq!(out.raster.pixel(5, 3), Some(bg));
    assert_eq!(out.raster.pixel(4, 1), Some(RED));
    assert_eq!(out.stats.pixels_absent, 16);
    assert_eq!(out.stats.pixels_written, 16);
}

#[test]
fn sides_only_still_needs_all_four_sides() {
    let mut faces = colored_cube();
    faces.remove(CubeFace::Left);
    let sources = SourceSet::Cube(faces);
    let cfg = RunConfig::equirect(8).with_variant(Variant::Cube {
        requirement: CubeRequirement::SidesOnly,
    });
    let err = ProjectionEngine::new(cfg, &sources).unwrap_err();
    assert!(matches!(
        err,
        StitchError::InsufficientInput {
            required: 4,
            supplied: 3,
            ..
        }
    ));
}

#[test]
fn variant_must_match_sources() {
    let sources = SourceSet::Ring(ring_of(4, 10));
    let err = ProjectionEngine::new(RunConfig::equirect(40), &sources).unwrap_err();
    assert!(matches!(err, StitchError::Validation(_)));
}

#[test]
fn invalid_config_is_rejected_before_sources() {
    let sources = SourceSet::Cube(colored_cube());
    let cfg = RunConfig {
        width: 9,
        height: 4,
        ..RunConfig::default()
    };
    assert!(matches!(
        ProjectionEngine::new(cfg, &sources),
        Err(StitchError::Validation(_))
    ));
}

#[test]
fn empty_rgba_image_face_is_rejected() {
    let faces = colored_cube().with(CubeFace::Top, image::RgbaImage::new(0, 0));
    let sources = SourceSet::Cube(faces);
    let err = ProjectionEngine::new(RunConfig::equirect(8), &sources).unwrap_err();
    assert!(err.to_string().contains("top"));
}

#[test]
fn ring_maps_columns_to_slots() {
    let sources = SourceSet::Ring(ring_of(4, 100));
    let cfg = RunConfig::equirect(400).with_variant(Variant::Ring { min_images: 4 });
    let engine = ProjectionEngine::new(cfg, &sources).unwrap();

    assert_eq!(engine.sample_at(0, 0), Sample::Hit(Rgba8::opaque(0, 0, 0)));
    // localU = 0.99 -> floor(0.99 * 99) = 98.
    assert_eq!(engine.sample_at(99, 0), Sample::Hit(Rgba8::opaque(0, 98, 0)));
    assert_eq!(engine.sample_at(100, 0), Sample::Hit(Rgba8::opaque(1, 0, 0)));
    // v = 199 / 200 -> floor(0.995 * 9) = 8.
    assert_eq!(engine.sample_at(399, 199), Sample::Hit(Rgba8::opaque(3, 98, 8)));
}

#[test]
fn ring_rows_use_half_open_fraction_for_every_latitude_span() {
    let sources = SourceSet::Ring(ring_of(4, 100));
    for span in [LatitudeSpan::PoleToPole, LatitudeSpan::HalfOpen] {
        let cfg = RunConfig::equirect(400)
            .with_variant(Variant::Ring { min_images: 4 })
            .with_latitude(span);
        let engine = ProjectionEngine::new(cfg, &sources).unwrap();
        let row = engine.sample_at(0, 199).pixel().unwrap().b;
        assert_eq!(u32::from(row), texel_index(199.0 / 200.0, 10), "{span:?}");
        assert_eq!(row, 8);
        assert_eq!(engine.sample_at(0, 100).pixel().unwrap().b, 4);
    }
}

#[test]
fn rendered_hits_are_opaque_but_background_keeps_its_alpha() {
    let glass = Rgba8::new(200, 100, 50, 60);
    let mut faces = colored_cube().with(CubeFace::Top, solid(glass));
    faces.remove(CubeFace::Bottom);
    let sources = SourceSet::Cube(faces);
    let cfg = RunConfig::equirect(8).with_variant(Variant::Cube {
        requirement: CubeRequirement::SidesOnly,
    });
    let engine = ProjectionEngine::new(cfg, &sources).unwrap();
    assert_eq!(engine.sample_at(0, 0), Sample::Hit(glass));

    let out = engine.render();
    assert_eq!(out.raster.pixel(0, 0), Some(Rgba8::opaque(200, 100, 50)));
    assert_eq!(out.raster.pixel(0, 3), Some(Rgba8::TRANSPARENT));

    let par = engine.render_parallel(Some(2)).unwrap();
    assert_eq!(par.raster, out.raster);
}

#[test]
fn ring_below_minimum_refuses_to_start() {
    let sources = SourceSet::Ring(ring_of(3, 10));
    let cfg = RunConfig::equirect(40).with_variant(Variant::Ring { min_images: 4 });
    let err = ProjectionEngine::new(cfg, &sources).unwrap_err();
    assert!(matches!(
        err,
        StitchError::InsufficientInput {
            required: 4,
            supplied: 3,
            ..
        }
    ));

    let sources = SourceSet::Ring(ring_of(5, 10));
    let cfg = RunConfig::equirect(40).with_variant(Variant::Ring { min_images: 6 });
    assert!(ProjectionEngine::new(cfg, &sources).is_err());
}

#[test]
fn ring_empty_slot_is_absorbed() {
    let mut ring = ring_of(4, 10);
    ring.push(None);
    let sources = SourceSet::Ring(ring);
    let cfg = RunConfig::equirect(50).with_variant(Variant::Ring { min_images: 4 });
    let out = ProjectionEngine::new(cfg, &sources).unwrap().render();
    assert!(out.completed);
    assert_eq!(out.raster.pixel(45, 3), Some(Rgba8::TRANSPARENT));
    assert_eq!(out.raster.pixel(39, 3).map(|p| p.r), Some(3));
    assert_eq!(out.stats.pixels_absent, 10 * 25);
}

#[test]
fn chunking_and_parallelism_do_not_change_output() {
    let sources = SourceSet::Cube(checker_cube(16));
    let base = RunConfig::equirect(64);
    let reference = ProjectionEngine::new(base.clone().with_chunk_rows(1), &sources)
        .unwrap()
        .render();

    for chunk_rows in [0, 3, 7, 32, 50] {
        let engine =
            ProjectionEngine::new(base.clone().with_chunk_rows(chunk_rows), &sources).unwrap();
        let seq = engine.render();
        assert_eq!(seq.raster, reference.raster, "chunk_rows={chunk_rows}");
        assert_eq!(seq.stats, reference.stats);

        let par = engine.render_parallel(Some(3)).unwrap();
        assert_eq!(par.raster, reference.raster, "parallel chunk_rows={chunk_rows}");
        assert_eq!(par.stats, reference.stats);
    }
}

#[test]
fn checkpoints_cover_every_row_once() {
    let sources = SourceSet::Cube(colored_cube());
    let cfg = RunConfig::equirect(20).with_chunk_rows(4);
    let engine = ProjectionEngine::new(cfg, &sources).unwrap();
    let checkpoints: Vec<_> = engine.run().collect();
    assert_eq!(checkpoints.len(), 3);
    assert_eq!(
        checkpoints
            .iter()
            .map(|c| (c.start_row, c.end_row))
            .collect::<Vec<_>>(),
        vec![(0, 4), (4, 8), (8, 10)]
    );
    assert!(checkpoints[2].is_last());
    assert!(!checkpoints[0].is_last());
    assert!((checkpoints[0].fraction_done() - 0.4).abs() < 1e-12);
}

#[test]
fn cancelled_run_returns_partial_raster() {
    let sources = SourceSet::Cube(colored_cube());
    let bg = Rgba8::new(9, 9, 9, 9);
    let cfg = RunConfig::equirect(16)
        .with_chunk_rows(2)
        .with_background(bg);
    let engine = ProjectionEngine::new(cfg, &sources).unwrap();

    let mut seen = 0;
    let out = engine.drive(|_| {
        seen += 1;
        ControlFlow::Break(())
    });
    assert_eq!(seen, 1);
    assert!(!out.completed);
    assert_eq!(out.stats.rows_completed, 2);
    assert_eq!(out.raster.pixel(0, 0), Some(Rgba8::WHITE));
    for y in 2..8 {
        for x in 0..16 {
            assert_eq!(out.raster.pixel(x, y), Some(bg));
        }
    }

    let full = engine.render();
    for x in 0..16 {
        assert_eq!(out.raster.pixel(x, 1), full.raster.pixel(x, 1));
    }
}

#[test]
fn run_can_be_resumed_and_restarted() {
    let sources = SourceSet::Cube(checker_cube(8));
    let engine = ProjectionEngine::new(RunConfig::equirect(32).with_chunk_rows(5), &sources)
        .unwrap();

    let mut run = engine.run();
    assert!(run.next().is_some());
    assert!(!run.is_complete());
    assert_eq!(run.stats().rows_completed, 5);
    let reference = engine.render().raster;
    for x in 0..32 {
        assert_eq!(run.output().pixel(x, 4), reference.pixel(x, 4));
        assert_eq!(run.output().pixel(x, 5), Some(Rgba8::TRANSPARENT));
    }
    let finished = run.finish();
    assert!(finished.completed);

    let again = engine.run().finish();
    assert_eq!(again.raster, finished.raster);
    assert_eq!(again.raster, engine.render().raster);
}

#[test]
fn zero_threads_is_rejected() {
    let sources = SourceSet::Cube(colored_cube());
    let engine = ProjectionEngine::new(RunConfig::equirect(8), &sources).unwrap();
    assert!(engine.render_parallel(Some(0)).is_err());
}
