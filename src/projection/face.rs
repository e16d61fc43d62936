use crate::foundation::{core::Direction, error::StitchError};

/// One of the six axis-aligned cube faces.
///
/// Axis convention: `+X` is RIGHT, `+Y` is TOP and `+Z` is BACK (FRONT looks down `-Z`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CubeFace {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl CubeFace {
    /// All faces, in slot order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Front,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Right,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    /// The four faces around the horizon.
    pub const SIDES: [CubeFace; 4] = [
        CubeFace::Front,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Right,
    ];

    /// Slot index of this face in [`CubeFace::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Pick the face a direction falls on.
    ///
    /// Dominant-axis selection with ties resolved X first, then Y, then Z. The comparisons are
    /// non-strict on purpose: on an exact cube edge the earlier axis wins.
    pub fn select(dir: Direction) -> Self {
        let (x, y, z) = (dir.dx(), dir.dy(), dir.dz());
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());

        if ax >= ay && ax >= az {
            if x > 0.0 { Self::Right } else { Self::Left }
        } else if ay >= ax && ay >= az {
            if y > 0.0 { Self::Top } else { Self::Bottom }
        } else if z > 0.0 {
            Self::Back
        } else {
            Self::Front
        }
    }
}

impl std::fmt::Display for CubeFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CubeFace {
    type Err = StitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StitchError::validation(format!("unknown cube face '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/projection/face.rs"]
mod tests;
