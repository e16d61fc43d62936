//! Per-face gnomonic projection.
//!
//! Each face divides the two non-dominant direction components by the signed dominant one
//! and remaps the result from `[-1, 1]` to `[0, 1]`. The formulas live in a fixed table keyed
//! by [`CubeFace::index`], next to their inverses.

use crate::{
    foundation::core::{DVec3, Direction, Uv},
    projection::face::CubeFace,
};

struct FaceProjection {
    project: fn(DVec3) -> Uv,
    unproject: fn(f64, f64) -> DVec3,
}

// Slot order matches `CubeFace::ALL`.
const FACE_TABLE: [FaceProjection; 6] = [
    FaceProjection {
        project: project_front,
        unproject: unproject_front,
    },
    FaceProjection {
        project: project_back,
        unproject: unproject_back,
    },
    FaceProjection {
        project: project_left,
        unproject: unproject_left,
    },
    FaceProjection {
        project: project_right,
        unproject: unproject_right,
    },
    FaceProjection {
        project: project_top,
        unproject: unproject_top,
    },
    FaceProjection {
        project: project_bottom,
        unproject: unproject_bottom,
    },
];

fn remap(s: f64, t: f64) -> Uv {
    Uv::new((s + 1.0) / 2.0, (t + 1.0) / 2.0)
}

fn project_front(d: DVec3) -> Uv {
    remap(-d.x / d.z, -d.y / d.z)
}

fn project_back(d: DVec3) -> Uv {
    remap(d.x / -d.z, -d.y / -d.z)
}

fn project_left(d: DVec3) -> Uv {
    remap(d.z / -d.x, -d.y / -d.x)
}

fn project_right(d: DVec3) -> Uv {
    remap(-d.z / d.x, -d.y / d.x)
}

fn project_top(d: DVec3) -> Uv {
    remap(-d.x / d.y, d.z / d.y)
}

fn project_bottom(d: DVec3) -> Uv {
    remap(-d.x / -d.y, -d.z / -d.y)
}

// Inverses return a point on the face plane (dominant component = +/-1), not yet normalized.

fn unproject_front(s: f64, t: f64) -> DVec3 {
    DVec3::new(s, t, -1.0)
}

fn unproject_back(s: f64, t: f64) -> DVec3 {
    DVec3::new(-s, t, 1.0)
}

fn unproject_left(s: f64, t: f64) -> DVec3 {
    DVec3::new(-1.0, -t, s)
}

fn unproject_right(s: f64, t: f64) -> DVec3 {
    DVec3::new(1.0, -t, -s)
}

fn unproject_top(s: f64, t: f64) -> DVec3 {
    DVec3::new(-s, 1.0, t)
}

fn unproject_bottom(s: f64, t: f64) -> DVec3 {
    DVec3::new(-s, -1.0, -t)
}

/// Face-local coordinate of `dir` on `face`.
///
/// Lands in `[0,1]^2` (up to rounding) when `face == CubeFace::select(dir)`; other faces give
/// coordinates outside the square or non-finite values.
pub fn face_uv(dir: Direction, face: CubeFace) -> Uv {
    (FACE_TABLE[face.index()].project)(dir.0)
}

/// Unit direction that projects to `uv` on `face`.
pub fn face_direction(face: CubeFace, uv: Uv) -> Direction {
    let s = uv.u * 2.0 - 1.0;
    let t = uv.v * 2.0 - 1.0;
    Direction((FACE_TABLE[face.index()].unproject)(s, t).normalize())
}

#[cfg(test)]
#[path = "../../tests/unit/projection/uv.rs"]
mod tests;
