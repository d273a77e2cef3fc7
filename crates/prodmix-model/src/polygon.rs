//! Extreme points of the feasible region.
//!
//! With two variables the region `A x <= b, x >= 0` is a convex polygon
//! (possibly unbounded, possibly empty) whose corners are pairwise
//! intersections of the four boundary lines: the two resource rows and the
//! two axes. Enumerating them gives the polygon for fill rendering and an
//! independent check of the simplex optimum.

use crate::model::{LpModel, Resource};

/// Relative tolerance for feasibility of a candidate corner
const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// A boundary line `a*x + b*y = k`
#[derive(Debug, Clone, Copy)]
struct Line {
    a: f64,
    b: f64,
    k: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FeasiblePolygon {
    /// Corners, counter-clockwise around their centroid
    pub vertices: Vec<[f64; 2]>,
    /// Extreme rays of the directions along which the region extends forever
    pub recession: Vec<[f64; 2]>,
}

impl FeasiblePolygon {
    pub fn from_model(model: &LpModel) -> Self {
        let mut lines: Vec<Line> = Resource::ALL
            .iter()
            .map(|&r| {
                let [a, b] = model.coefficients(r);
                Line {
                    a,
                    b,
                    k: model.capacity(r),
                }
            })
            .collect();
        lines.push(Line { a: 1.0, b: 0.0, k: 0.0 });
        lines.push(Line { a: 0.0, b: 1.0, k: 0.0 });

        let mut vertices: Vec<[f64; 2]> = Vec::new();
        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                let Some(p) = intersect(lines[i], lines[j]) else {
                    continue;
                };
                if is_feasible(model, p) && !vertices.iter().any(|v| same_point(*v, p)) {
                    vertices.push(p);
                }
            }
        }
        sort_counter_clockwise(&mut vertices);

        let recession = if vertices.is_empty() {
            Vec::new()
        } else {
            recession_rays(model)
        };

        Self { vertices, recession }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_bounded(&self) -> bool {
        self.recession.is_empty()
    }

    /// The corner with the highest profit and that profit.
    ///
    /// Ties go to the first corner in counter-clockwise order. Only
    /// meaningful when the profit cannot grow along any recession ray.
    pub fn best_vertex(&self, profits: [f64; 2]) -> Option<([f64; 2], f64)> {
        let profit = |p: [f64; 2]| profits[0] * p[0] + profits[1] * p[1];
        self.vertices.iter().fold(None, |best, &v| {
            let value = profit(v);
            match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((v, value)),
            }
        })
    }

    /// Whether profit grows without limit on this region.
    ///
    /// Profit is linear along the recession cone, so checking its extreme
    /// rays is enough.
    pub fn profit_unbounded(&self, profits: [f64; 2]) -> bool {
        self.recession
            .iter()
            .any(|&[dx, dy]| profits[0] * dx + profits[1] * dy > FEASIBILITY_TOLERANCE)
    }
}

fn intersect(l1: Line, l2: Line) -> Option<[f64; 2]> {
    let det = l1.a * l2.b - l2.a * l1.b;
    let scale = (l1.a.abs() + l1.b.abs()) * (l2.a.abs() + l2.b.abs());
    if scale == 0.0 || det.abs() <= f64::EPSILON * scale {
        return None;
    }
    let x = (l1.k * l2.b - l2.k * l1.b) / det;
    let y = (l1.a * l2.k - l2.a * l1.k) / det;
    Some([x, y])
}

fn is_feasible(model: &LpModel, [x, y]: [f64; 2]) -> bool {
    let slack = |v: f64| FEASIBILITY_TOLERANCE * v.abs().max(1.0);
    x >= -slack(0.0)
        && y >= -slack(0.0)
        && Resource::ALL.iter().all(|&r| {
            let cap = model.capacity(r);
            model.usage(r, x, y) <= cap + slack(cap)
        })
}

fn same_point(p: [f64; 2], q: [f64; 2]) -> bool {
    let scale = p[0].abs().max(p[1].abs()).max(1.0);
    (p[0] - q[0]).abs() <= FEASIBILITY_TOLERANCE * scale && (p[1] - q[1]).abs() <= FEASIBILITY_TOLERANCE * scale
}

fn sort_counter_clockwise(points: &mut [[f64; 2]]) {
    if points.len() < 3 {
        return;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let cy = points.iter().map(|p| p[1]).sum::<f64>() / n;
    points.sort_by(|p, q| {
        let ap = (p[1] - cy).atan2(p[0] - cx);
        let aq = (q[1] - cy).atan2(q[0] - cx);
        ap.total_cmp(&aq)
    });
}

/// Extreme rays of the cone of non-negative directions `d` with `A d <= 0`,
/// parametrized as `(t, 1 - t)` for `t` in `[lo, hi]`
fn recession_rays(model: &LpModel) -> Vec<[f64; 2]> {
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);

    // Row requires a*t + b*(1 - t) <= 0, i.e. b + (a - b) t <= 0
    for r in Resource::ALL {
        let [a, b] = model.coefficients(r);
        let slope = a - b;
        if slope > 0.0 {
            hi = hi.min(-b / slope);
        } else if slope < 0.0 {
            lo = lo.max(-b / slope);
        } else if b > 0.0 {
            return Vec::new();
        }
    }

    if lo > hi {
        Vec::new()
    } else if hi - lo <= FEASIBILITY_TOLERANCE {
        vec![[lo, 1.0 - lo]]
    } else {
        vec![[lo, 1.0 - lo], [hi, 1.0 - hi]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ProductionInputs;
    use crate::optimize::{ProductionSolution, solve};
    use approx::assert_abs_diff_eq;

    fn polygon(inputs: ProductionInputs) -> FeasiblePolygon {
        FeasiblePolygon::from_model(&LpModel::build(&inputs).unwrap())
    }

    fn contains(vertices: &[[f64; 2]], p: [f64; 2]) -> bool {
        vertices.iter().any(|v| (v[0] - p[0]).abs() < 1e-9 && (v[1] - p[1]).abs() < 1e-9)
    }

    #[test]
    fn test_default_polygon_corners() {
        let poly = polygon(ProductionInputs::default());

        assert_eq!(poly.vertices.len(), 4);
        assert!(poly.is_bounded());
        for corner in [[0.0, 0.0], [50.0, 0.0], [40.0, 20.0], [0.0, 80.0]] {
            assert!(contains(&poly.vertices, corner), "missing {:?} in {:?}", corner, poly.vertices);
        }
    }

    #[test]
    fn test_best_vertex() {
        let poly = polygon(ProductionInputs::default());
        let ([x, y], profit) = poly.best_vertex([5000.0, 3000.0]).unwrap();
        assert_abs_diff_eq!(x, 40.0, epsilon = 1e-9);
        assert_abs_diff_eq!(y, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(profit, 260000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_capacity_collapses_to_origin() {
        let poly = polygon(ProductionInputs {
            material_capacity: 0.0,
            ..ProductionInputs::default()
        });
        assert_eq!(poly.vertices, vec![[0.0, 0.0]]);
    }

    #[test]
    fn test_negative_capacity_is_empty() {
        let poly = polygon(ProductionInputs {
            material_capacity: -10.0,
            ..ProductionInputs::default()
        });
        assert!(poly.is_empty());
        assert!(poly.best_vertex([1.0, 1.0]).is_none());
    }

    #[test]
    fn test_free_product_has_recession_direction() {
        let poly = polygon(ProductionInputs {
            consume_a_material: 0.0,
            consume_a_time: 0.0,
            ..ProductionInputs::default()
        });
        assert!(!poly.is_bounded());
        assert!(poly.profit_unbounded([5000.0, 3000.0]));
        assert!(!poly.profit_unbounded([0.0, 3000.0]));
        assert_eq!(poly.recession, vec![[1.0, 0.0]]);
    }

    #[test]
    fn test_free_orthant_has_both_axis_rays() {
        let poly = polygon(ProductionInputs {
            consume_a_material: 0.0,
            consume_b_material: 0.0,
            consume_a_time: 0.0,
            consume_b_time: 0.0,
            ..ProductionInputs::default()
        });
        assert_eq!(poly.recession, vec![[0.0, 1.0], [1.0, 0.0]]);
        // Losing money on B does not stop A from growing
        assert!(poly.profit_unbounded([1.0, -3.0]));
        assert!(poly.profit_unbounded([-3.0, 1.0]));
        assert!(!poly.profit_unbounded([-1.0, -1.0]));
    }

    #[test]
    fn test_profit_unbounded_agrees_with_simplex() {
        let cases = [
            ([1.0, -3.0], [[0.0, 0.0], [0.0, 0.0]], [100.0, 80.0]),
            ([-3.0, 1.0], [[0.0, 0.0], [0.0, 0.0]], [100.0, 80.0]),
            ([-1.0, -1.0], [[0.0, 0.0], [0.0, 0.0]], [100.0, 80.0]),
            ([-1.0, 2.0], [[0.0, 1.0], [0.0, 1.0]], [100.0, 80.0]),
            ([2.0, -1.0], [[0.0, 1.0], [0.0, 1.0]], [100.0, 80.0]),
            ([1.0, -1.0], [[1.0, -1.0], [0.0, 0.0]], [10.0, 5.0]),
            ([2.0, -1.0], [[1.0, -1.0], [0.0, 0.0]], [10.0, 5.0]),
            ([-1.0, 2.0], [[1.0, -1.0], [0.0, 0.0]], [10.0, 5.0]),
            ([5000.0, 3000.0], [[2.0, 1.0], [1.5, 1.0]], [100.0, 80.0]),
            ([5000.0, -3000.0], [[0.0, 1.0], [0.0, 1.0]], [100.0, 80.0]),
        ];

        for ([pa, pb], [[am, bm], [at, bt]], [mc, tc]) in cases {
            let model = LpModel::build(&ProductionInputs {
                profit_a: pa,
                profit_b: pb,
                consume_a_material: am,
                consume_b_material: bm,
                consume_a_time: at,
                consume_b_time: bt,
                material_capacity: mc,
                time_capacity: tc,
            })
            .unwrap();
            let poly = FeasiblePolygon::from_model(&model);
            let solution = solve(&model);

            assert_eq!(
                poly.profit_unbounded(model.profits()),
                solution == ProductionSolution::Unbounded,
                "profits {:?}, rows {:?}: rays {:?}, simplex {:?}",
                [pa, pb],
                model.constraint_matrix(),
                poly.recession,
                solution
            );
            if let Some(profit) = solution.total_profit() {
                let (_, best) = poly.best_vertex(model.profits()).unwrap();
                assert_abs_diff_eq!(profit, best, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_counter_clockwise_order() {
        let poly = polygon(ProductionInputs::default());
        // Shoelace area is positive for counter-clockwise order
        let v = &poly.vertices;
        let area: f64 = (0..v.len())
            .map(|i| {
                let (p, q) = (v[i], v[(i + 1) % v.len()]);
                p[0] * q[1] - q[0] * p[1]
            })
            .sum::<f64>()
            / 2.0;
        // Region area: triangle-ish quadrilateral (0,0) (50,0) (40,20) (0,80)
        assert_abs_diff_eq!(area, 2100.0, epsilon = 1e-6);
    }
}
