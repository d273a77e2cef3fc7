/// The result of solving an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable (empty unless a candidate point exists)
    pub values: Vec<f64>,
    /// Objective value at `values`, in the problem's own sense
    pub objective_value: f64,
    /// Number of simplex pivots performed across both phases
    pub iterations: usize,
    /// Constraint violations of the candidate point (populated on numerical failure)
    pub violations: Vec<ConstraintViolation>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal solution was found and verified
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The iteration limit was hit, or the extracted point failed verification
    NumericalFailure,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    /// Constraint or bound name
    pub constraint: String,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub violation_amount: f64,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn optimal(values: Vec<f64>, objective_value: f64, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
            violations: Vec::new(),
        }
    }

    pub fn infeasible(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Infeasible,
            values: Vec::new(),
            objective_value: f64::NAN,
            iterations,
            violations: Vec::new(),
        }
    }

    pub fn unbounded(minimize: bool, iterations: usize) -> Self {
        Self {
            status: SolutionStatus::Unbounded,
            values: Vec::new(),
            objective_value: if minimize { f64::NEG_INFINITY } else { f64::INFINITY },
            iterations,
            violations: Vec::new(),
        }
    }

    pub fn numerical_failure(iterations: usize) -> Self {
        Self {
            status: SolutionStatus::NumericalFailure,
            values: Vec::new(),
            objective_value: f64::NAN,
            iterations,
            violations: Vec::new(),
        }
    }

    /// A candidate point that did not pass the feasibility check
    pub fn unverified(
        values: Vec<f64>,
        objective_value: f64,
        iterations: usize,
        violations: Vec<ConstraintViolation>,
    ) -> Self {
        Self {
            status: SolutionStatus::NumericalFailure,
            values,
            objective_value,
            iterations,
            violations,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
