use std::f64::consts::{PI, TAU};

use crate::foundation::core::{Canvas, Direction};

/// How output rows map onto colatitude in cube runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatitudeSpan {
    /// `v = y / (H - 1)`: the top row is the north pole and the bottom row the south pole.
    #[default]
    PoleToPole,
    /// `v = y / H`: rows cover `[0, 1)` and the bottom row stops one row short of the pole.
    HalfOpen,
}

impl LatitudeSpan {
    /// Vertical fraction in `[0, 1]` for output row `y` of a raster `height` rows tall.
    pub fn row_fraction(self, y: u32, height: u32) -> f64 {
        match self {
            Self::PoleToPole if height > 1 => f64::from(y) / f64::from(height - 1),
            Self::PoleToPole => 0.0,
            Self::HalfOpen => f64::from(y) / f64::from(height),
        }
    }
}

/// Direction for longitude `theta` and colatitude `phi` (0 at the north pole).
pub fn direction_from_angles(theta: f64, phi: f64) -> Direction {
    // sin(PI) is ~1.2e-16 in f64; pin the south pole so it lands on (0,-1,0).
    let sin_phi = if phi >= PI { 0.0 } else { phi.sin() };
    Direction::new(sin_phi * theta.sin(), phi.cos(), sin_phi * theta.cos())
}

/// Viewing direction for output pixel `(x, y)`.
pub fn direction_for_pixel(x: u32, y: u32, canvas: Canvas, span: LatitudeSpan) -> Direction {
    let u = f64::from(x) / f64::from(canvas.width);
    let v = span.row_fraction(y, canvas.height);
    direction_from_angles(u * TAU, v * PI)
}

#[cfg(test)]
#[path = "../../tests/unit/projection/direction.rs"]
mod tests;
