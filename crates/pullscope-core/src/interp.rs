// File: crates/pullscope-core/src/interp.rs
// Summary: Line smoothing modes; monotone cubic (Fritsch-Carlson) control points.
// Notes:
// - Tangents are limited so that every Hermite segment stays monotone between its
//   endpoints; the curve never dips below a local minimum or above a local maximum.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    MonotoneCubic,
    Linear,
}

/// One cubic Bezier segment from `p0` to `p3`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicSegment {
    pub p0: (f64, f64),
    pub c1: (f64, f64),
    pub c2: (f64, f64),
    pub p3: (f64, f64),
}

impl CubicSegment {
    pub fn eval(&self, t: f64) -> (f64, f64) {
        let u = 1.0 - t;
        let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        (
            a * self.p0.0 + b * self.c1.0 + c * self.c2.0 + d * self.p3.0,
            a * self.p0.1 + b * self.c1.1 + c * self.c2.1 + d * self.p3.1,
        )
    }
}

/// Per-point tangents (dy/dx) for monotone cubic interpolation.
///
/// `points` must be ordered by x. Repeated x values get a flat tangent.
pub fn monotone_tangents(points: &[(f64, f64)]) -> Vec<f64> {
    let n = points.len();
    if n < 2 {
        return vec![0.0; n];
    }

    let deltas: Vec<f64> = points
        .windows(2)
        .map(|w| {
            let dx = w[1].0 - w[0].0;
            if dx.abs() < f64::EPSILON { 0.0 } else { (w[1].1 - w[0].1) / dx }
        })
        .collect();

    let mut m = vec![0.0; n];
    m[0] = deltas[0];
    m[n - 1] = deltas[n - 2];
    for i in 1..n - 1 {
        let (d0, d1) = (deltas[i - 1], deltas[i]);
        m[i] = if d0 * d1 <= 0.0 { 0.0 } else { (d0 + d1) * 0.5 };
    }

    for i in 0..n - 1 {
        let d = deltas[i];
        if d.abs() < f64::EPSILON {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let a = m[i] / d;
        let b = m[i + 1] / d;
        let s = a * a + b * b;
        if s > 9.0 {
            let t = 3.0 / s.sqrt();
            m[i] = t * a * d;
            m[i + 1] = t * b * d;
        }
    }
    m
}

/// Bezier segments between consecutive points using monotone tangents.
pub fn monotone_segments(points: &[(f64, f64)]) -> Vec<CubicSegment> {
    let m = monotone_tangents(points);
    points
        .windows(2)
        .zip(m.windows(2))
        .map(|(p, t)| {
            let dx = (p[1].0 - p[0].0) / 3.0;
            CubicSegment {
                p0: p[0],
                c1: (p[0].0 + dx, p[0].1 + t[0] * dx),
                c2: (p[1].0 - dx, p[1].1 - t[1] * dx),
                p3: p[1],
            }
        })
        .collect()
}
