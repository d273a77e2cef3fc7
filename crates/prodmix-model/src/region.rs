//! Boundary curves of the feasible region, sampled for plotting.
//!
//! Each resource row `a*x + b*y <= k` is drawn as product B as a function of
//! product A, `y = max(0, (k - a*x) / b)`. Samples where a row puts no upper
//! limit on `y` carry `f64::INFINITY`.

use tracing::debug;

use crate::model::{LpModel, ModelError, Resource};

/// Number of samples along the product A axis
pub const DEFAULT_SAMPLES: usize = 400;

/// Fewest samples that still span `[0, x_max]`
pub const MIN_SAMPLES: usize = 2;

/// How a constraint row bounds product B
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryKind {
    /// `b != 0`: an ordinary line
    Sloped,
    /// `b == 0, a != 0`: the row only limits product A, at `x`
    Vertical { x: f64 },
    /// `a == 0, b == 0, k >= 0`: the row never binds
    Unconstrained,
    /// `a == 0, b == 0, k < 0`: no point satisfies the row
    Empty,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCurve {
    pub resource: Resource,
    pub kind: BoundaryKind,
    /// `(x, y)` samples in increasing sample order
    pub points: Vec<[f64; 2]>,
}

impl BoundaryCurve {
    /// Sample the boundary of `resource` at the given abscissae
    pub fn derive(model: &LpModel, resource: Resource, xs: &[f64]) -> Self {
        let [a, b] = model.coefficients(resource);
        let k = model.capacity(resource);

        let kind = match (a == 0.0, b == 0.0) {
            (_, false) => BoundaryKind::Sloped,
            (false, true) => BoundaryKind::Vertical { x: k / a },
            (true, true) if k >= 0.0 => BoundaryKind::Unconstrained,
            (true, true) => BoundaryKind::Empty,
        };

        let points = xs.iter().map(|&x| [x, upper_limit(a, b, k, x)]).collect();

        Self { resource, kind, points }
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p[1])
    }
}

/// Largest `y >= 0` allowed by `a*x + b*y <= k` at `x`, clamped to zero
fn upper_limit(a: f64, b: f64, k: f64, x: f64) -> f64 {
    if b != 0.0 {
        ((k - a * x) / b).max(0.0)
    } else if a * x <= k {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Both boundary curves plus the upper envelope of the feasible region
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FeasibleRegionCurves {
    pub material: BoundaryCurve,
    pub time: BoundaryCurve,
    /// Pointwise `max(0, min(material, time))`
    pub envelope: Vec<[f64; 2]>,
}

impl FeasibleRegionCurves {
    /// Sample both curves over `[0, x_max]` at [`DEFAULT_SAMPLES`] points
    pub fn derive(model: &LpModel, x_max: f64) -> Result<Self, ModelError> {
        Self::with_resolution(model, x_max, DEFAULT_SAMPLES)
    }

    /// Sample both curves over `[0, x_max]`. `x_max` may be negative (a
    /// negative material capacity gives a negative default range) but must be
    /// finite, and at least [`MIN_SAMPLES`] samples are required.
    pub fn with_resolution(model: &LpModel, x_max: f64, samples: usize) -> Result<Self, ModelError> {
        if !x_max.is_finite() {
            return Err(ModelError::NonFinite {
                field: "x_max",
                value: x_max,
            });
        }
        if samples < MIN_SAMPLES {
            return Err(ModelError::TooFewSamples {
                min: MIN_SAMPLES,
                found: samples,
            });
        }

        let xs = linspace(0.0, x_max, samples);
        let material = BoundaryCurve::derive(model, Resource::Material, &xs);
        let time = BoundaryCurve::derive(model, Resource::Time, &xs);

        let envelope = material
            .points
            .iter()
            .zip(&time.points)
            .map(|(m, t)| [m[0], m[1].min(t[1]).max(0.0)])
            .collect();

        debug!(x_max, samples, material = ?material.kind, time = ?time.kind, "derived boundary curves");
        Ok(Self {
            material,
            time,
            envelope,
        })
    }

    /// The plotting range used when none is given: the material capacity
    pub fn default_x_max(model: &LpModel) -> f64 {
        model.capacity(Resource::Material)
    }

    pub fn curve(&self, resource: Resource) -> &BoundaryCurve {
        match resource {
            Resource::Material => &self.material,
            Resource::Time => &self.time,
        }
    }

    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.envelope.iter().map(|p| p[0])
    }

    pub fn len(&self) -> usize {
        self.envelope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelope.is_empty()
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}
