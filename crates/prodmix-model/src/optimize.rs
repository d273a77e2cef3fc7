use prodmix_solver::{SolutionStatus, Solver};
use tracing::{debug, warn};

use crate::model::LpModel;

/// Outcome of optimizing the production mix
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProductionSolution {
    /// The profit-maximizing quantities of each product
    Optimal {
        quantity_a: f64,
        quantity_b: f64,
        total_profit: f64,
    },
    /// No production plan satisfies the constraints
    Infeasible,
    /// Profit can grow without limit
    Unbounded,
    /// The solver could not reach a verified optimum
    NumericalFailure,
}

impl ProductionSolution {
    pub fn is_optimal(&self) -> bool {
        matches!(self, ProductionSolution::Optimal { .. })
    }

    /// `(quantity_a, quantity_b)` when solved
    pub fn optimal_point(&self) -> Option<[f64; 2]> {
        match *self {
            ProductionSolution::Optimal {
                quantity_a, quantity_b, ..
            } => Some([quantity_a, quantity_b]),
            _ => None,
        }
    }

    pub fn total_profit(&self) -> Option<f64> {
        match *self {
            ProductionSolution::Optimal { total_profit, .. } => Some(total_profit),
            _ => None,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self {
            ProductionSolution::Optimal { .. } => "OPTIMAL",
            ProductionSolution::Infeasible => "INFEASIBLE",
            ProductionSolution::Unbounded => "UNBOUNDED",
            ProductionSolution::NumericalFailure => "NUMERICAL FAILURE",
        }
    }
}

/// Solve the model with the default simplex settings
pub fn solve(model: &LpModel) -> ProductionSolution {
    solve_with(&Solver::new(), model)
}

/// Solve the model with a configured solver
pub fn solve_with(solver: &Solver, model: &LpModel) -> ProductionSolution {
    let problem = model.to_lp_problem();

    let solution = match solver.solve(&problem) {
        Ok(solution) => solution,
        Err(e) => {
            warn!(error = %e, "solver rejected the production model");
            return ProductionSolution::NumericalFailure;
        }
    };

    let result = match solution.status {
        SolutionStatus::Optimal => match solution.values.as_slice() {
            &[quantity_a, quantity_b] => ProductionSolution::Optimal {
                quantity_a,
                quantity_b,
                // The solver minimized the negated profits
                total_profit: -solution.objective_value,
            },
            values => {
                warn!(len = values.len(), "solver returned the wrong number of values");
                ProductionSolution::NumericalFailure
            }
        },
        SolutionStatus::Infeasible => ProductionSolution::Infeasible,
        SolutionStatus::Unbounded => ProductionSolution::Unbounded,
        SolutionStatus::NumericalFailure => {
            for v in &solution.violations {
                warn!(constraint = %v.constraint, amount = v.violation_amount, "{}", v.description);
            }
            ProductionSolution::NumericalFailure
        }
    };

    debug!(?result, iterations = solution.iterations, "production model solved");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ProductionInputs;
    use crate::model::Resource;
    use crate::polygon::FeasiblePolygon;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn solve_inputs(inputs: &ProductionInputs) -> ProductionSolution {
        solve(&LpModel::build(inputs).unwrap())
    }

    fn assert_feasible(model: &LpModel, point: [f64; 2]) {
        let [qa, qb] = point;
        assert!(qa >= 0.0 && qb >= 0.0, "negative quantity {:?}", point);
        for resource in Resource::ALL {
            let cap = model.capacity(resource);
            let used = model.usage(resource, qa, qb);
            assert!(
                used <= cap + 1e-6 * cap.abs().max(1.0),
                "{} uses {} of {}",
                resource.name(),
                used,
                cap
            );
        }
    }

    #[test]
    fn test_default_scenario() {
        // The binding corner of 2a + b <= 100 and 1.5a + b <= 80
        let inputs = ProductionInputs::default();
        let model = LpModel::build(&inputs).unwrap();
        let solution = solve(&model);

        let ProductionSolution::Optimal {
            quantity_a,
            quantity_b,
            total_profit,
        } = solution
        else {
            panic!("expected optimal, got {:?}", solution);
        };

        assert_abs_diff_eq!(quantity_a, 40.0, epsilon = 1e-6);
        assert_abs_diff_eq!(quantity_b, 20.0, epsilon = 1e-6);
        assert_relative_eq!(total_profit, 260000.0, max_relative = 1e-9);
        assert_feasible(&model, [quantity_a, quantity_b]);
    }

    #[test]
    fn test_default_scenario_matches_vertex_enumeration() {
        let model = LpModel::build(&ProductionInputs::default()).unwrap();
        let (_, best) = FeasiblePolygon::from_model(&model).best_vertex(model.profits()).unwrap();
        assert_relative_eq!(solve(&model).total_profit().unwrap(), best, max_relative = 1e-9);
    }

    #[test]
    fn test_zero_material_capacity() {
        let inputs = ProductionInputs {
            material_capacity: 0.0,
            ..ProductionInputs::default()
        };
        let solution = solve_inputs(&inputs);

        let [qa, qb] = solution.optimal_point().expect("degenerate model should solve");
        assert_abs_diff_eq!(qa, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(qb, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.total_profit().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_capacity_is_infeasible() {
        let inputs = ProductionInputs {
            material_capacity: -10.0,
            ..ProductionInputs::default()
        };
        assert_eq!(solve_inputs(&inputs), ProductionSolution::Infeasible);
    }

    #[test]
    fn test_free_product_is_unbounded() {
        let inputs = ProductionInputs {
            consume_a_material: 0.0,
            consume_a_time: 0.0,
            ..ProductionInputs::default()
        };
        assert_eq!(solve_inputs(&inputs), ProductionSolution::Unbounded);
    }

    #[test]
    fn test_free_product_without_profit_is_not_unbounded() {
        let inputs = ProductionInputs {
            profit_a: 0.0,
            consume_a_material: 0.0,
            consume_a_time: 0.0,
            ..ProductionInputs::default()
        };
        let solution = solve_inputs(&inputs);
        // Only product B earns anything, limited by 80 hours
        assert_relative_eq!(solution.total_profit().unwrap(), 240000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_tied_objective_reports_optimal_profit() {
        // Profit ratio equals the time row ratio, so the whole time edge is optimal
        let inputs = ProductionInputs {
            profit_a: 4500.0,
            profit_b: 3000.0,
            ..ProductionInputs::default()
        };
        let model = LpModel::build(&inputs).unwrap();
        let solution = solve(&model);

        assert_relative_eq!(solution.total_profit().unwrap(), 240000.0, max_relative = 1e-9);
        assert_feasible(&model, solution.optimal_point().unwrap());
    }

    #[test]
    fn test_profit_matches_quantities_across_inputs() {
        let cases = [
            (5000.0, 3000.0, 2.0, 1.0, 1.5, 1.0, 100.0, 80.0),
            (1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 10.0, 10.0),
            (10.0, 25.0, 3.0, 4.0, 2.0, 6.0, 120.0, 90.0),
            (7.5, 2.0, 0.0, 1.0, 3.0, 0.5, 40.0, 30.0),
            (0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0),
            (3.0, 8.0, 5.0, 0.0, 0.0, 2.0, 25.0, 9.0),
            (12.0, 9.0, 0.25, 0.75, 1.25, 0.5, 1e6, 2e6),
        ];

        for (pa, pb, am, bm, at, bt, mc, tc) in cases {
            let inputs = ProductionInputs {
                profit_a: pa,
                profit_b: pb,
                consume_a_material: am,
                consume_b_material: bm,
                consume_a_time: at,
                consume_b_time: bt,
                material_capacity: mc,
                time_capacity: tc,
            };
            let model = LpModel::build(&inputs).unwrap();
            let solution = solve(&model);

            let [qa, qb] = solution
                .optimal_point()
                .unwrap_or_else(|| panic!("{:?} did not solve: {:?}", inputs, solution));
            assert_feasible(&model, [qa, qb]);

            let profit = solution.total_profit().unwrap();
            let expected = pa * qa + pb * qb;
            assert_relative_eq!(profit, expected, epsilon = 1e-9, max_relative = 1e-6);

            let (_, best) = FeasiblePolygon::from_model(&model).best_vertex(model.profits()).unwrap();
            assert_relative_eq!(profit, best, epsilon = 1e-9, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_capacity_scaling() {
        let base = ProductionInputs::default();
        let [qa0, qb0] = solve_inputs(&base).optimal_point().unwrap();
        let p0 = solve_inputs(&base).total_profit().unwrap();

        for s in [0.25, 0.5, 1.0, 1.5, 2.0, 10.0] {
            let scaled = solve_inputs(&base.with_scaled_capacities(s));
            let [qa, qb] = scaled.optimal_point().unwrap();
            let tol = 1e-6 * s.max(1.0) * 100.0;
            assert!(qa <= s * qa0 + tol && qb <= s * qb0 + tol, "s = {}: ({}, {})", s, qa, qb);

            let profit = scaled.total_profit().unwrap();
            assert_relative_eq!(profit, s * p0, max_relative = 1e-6);
            if s >= 1.0 {
                assert!(profit >= p0 - 1e-6 * p0);
            }
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ProductionSolution::Infeasible.status_label(), "INFEASIBLE");
        assert_eq!(ProductionSolution::Unbounded.optimal_point(), None);
        assert!(!ProductionSolution::NumericalFailure.is_optimal());
    }

    #[test]
    fn test_iteration_limit_surfaces_as_numerical_failure() {
        let model = LpModel::build(&ProductionInputs::default()).unwrap();
        let solver = Solver::new().with_max_iterations(0);
        assert_eq!(solve_with(&solver, &model), ProductionSolution::NumericalFailure);
    }
}
