use tracing::{debug, trace, warn};

use crate::problem::{ConstraintOp, LpProblem, ProblemError};
use crate::solution::{ConstraintViolation, Solution};

/// Consecutive degenerate pivots tolerated before switching to Bland's rule
const DEGENERATE_STREAK_LIMIT: usize = 8;

/// Simplex solver for linear programming problems
pub struct Solver {
    /// Maximum pivots (both phases together) before giving up
    max_iterations: usize,
    /// Tolerance for pivot selection and zero tests
    tolerance: f64,
    /// Relative tolerance for verifying constraints at the extracted point
    feasibility_tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            feasibility_tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRule {
    /// Most positive reduced cost
    Dantzig,
    /// Smallest eligible index, which cannot cycle
    Bland,
}

enum PhaseResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    /// Solve the LP problem using the two-phase simplex method.
    ///
    /// Structural problems (mismatched dimensions, non-finite data) are
    /// returned as errors; every other outcome, including infeasibility and
    /// unboundedness, is reported through the returned [`Solution`].
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, ProblemError> {
        problem.validate()?;

        let rows = standard_rows(problem);
        let mut tableau = Tableau::new(problem, &rows);
        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                Some(true) => {}
                Some(false) => {
                    debug!(iterations, "phase 1 left artificial weight, problem is infeasible");
                    return Ok(Solution::infeasible(iterations));
                }
                None => {
                    warn!(iterations, "iteration limit reached in phase 1");
                    return Ok(Solution::numerical_failure(iterations));
                }
            }
        }

        // Phase 2: Optimize
        match self.phase2(&mut tableau, &mut iterations) {
            PhaseResult::Optimal => {}
            PhaseResult::Unbounded => {
                debug!(iterations, "entering column has no limiting row, problem is unbounded");
                return Ok(Solution::unbounded(problem.objective.minimize, iterations));
            }
            PhaseResult::IterationLimit => {
                warn!(iterations, "iteration limit reached in phase 2");
                return Ok(Solution::numerical_failure(iterations));
            }
        }

        let values = self.extract_values(&tableau, problem);
        let objective_value = problem.evaluate(&values);

        let violations = self.find_violations(problem, &values);
        if !violations.is_empty() {
            warn!(count = violations.len(), "extracted point violates constraints");
            return Ok(Solution::unverified(values, objective_value, iterations, violations));
        }

        debug!(iterations, objective_value, "optimal solution found");
        Ok(Solution::optimal(values, objective_value, iterations))
    }

    /// Drive the artificial variables out of the basis. Returns `Some(false)`
    /// when no feasible point exists and `None` on iteration exhaustion.
    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> Option<bool> {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.n_cols();
        let art_start = tableau.art_start();

        // Set phase 1 objective: maximize -artificials (= minimize artificials)
        let original = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }

        // Make objective row consistent with basic artificial variables
        for i in 0..tableau.n_constraints() {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, art_start, iterations) {
            PhaseResult::Optimal => {}
            // The phase 1 objective is bounded by zero, so only the limit can stop it early
            PhaseResult::Unbounded | PhaseResult::IterationLimit => return None,
        }

        let rhs_col = tableau.rhs_col();
        let remaining: f64 = (0..tableau.n_constraints())
            .filter(|&i| tableau.basic_vars[i] >= art_start)
            .map(|i| tableau.data[i][rhs_col].abs())
            .sum();
        if remaining > self.feasibility_tolerance * tableau.rhs_scale {
            return Some(false);
        }

        // Artificials still basic at level zero are pivoted out where possible.
        // Rows with no structural entry are redundant and keep their artificial.
        for i in 0..tableau.n_constraints() {
            if tableau.basic_vars[i] >= art_start {
                if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                    self.pivot(tableau, i, col);
                }
            }
        }

        // Restore original objective and adjust for basic variables
        tableau.data[obj_row] = original;
        for i in 0..tableau.n_constraints() {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        Some(true)
    }

    fn phase2(&self, tableau: &mut Tableau, iterations: &mut usize) -> PhaseResult {
        // Exclude artificial variable columns from pivoting
        let limit = tableau.art_start();
        self.iterate(tableau, limit, iterations)
    }

    fn iterate(&self, tableau: &mut Tableau, limit: usize, iterations: &mut usize) -> PhaseResult {
        let rhs_col = tableau.rhs_col();
        let mut degenerate_streak = 0;

        loop {
            let rule = if degenerate_streak >= DEGENERATE_STREAK_LIMIT {
                PivotRule::Bland
            } else {
                PivotRule::Dantzig
            };

            let Some(pivot_col) = self.find_pivot_column(tableau, limit, rule) else {
                return PhaseResult::Optimal;
            };
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col, rule) else {
                return PhaseResult::Unbounded;
            };
            if *iterations >= self.max_iterations {
                return PhaseResult::IterationLimit;
            }

            if tableau.data[pivot_row][rhs_col].abs() <= self.tolerance {
                degenerate_streak += 1;
            } else {
                degenerate_streak = 0;
            }

            trace!(iteration = *iterations, row = pivot_row, col = pivot_col, ?rule, "pivot");
            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, limit: usize, rule: PivotRule) -> Option<usize> {
        let obj_row = tableau.obj_row();
        let reduced = &tableau.data[obj_row][..limit];

        match rule {
            PivotRule::Bland => reduced.iter().position(|&v| v > self.tolerance),
            PivotRule::Dantzig => {
                // Look for the most positive reduced cost (can improve objective)
                let mut max_val = self.tolerance;
                let mut max_col = None;
                for (j, &v) in reduced.iter().enumerate() {
                    if v > max_val {
                        max_val = v;
                        max_col = Some(j);
                    }
                }
                max_col
            }
        }
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize, rule: PivotRule) -> Option<usize> {
        let rhs_col = tableau.rhs_col();
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.n_constraints() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            // Round-off can leave a basic value a hair below zero
            let ratio = (tableau.data[i][rhs_col] / val).max(0.0);

            best = match best {
                Some((row, min_ratio)) if ratio > min_ratio + self.tolerance => Some((row, min_ratio)),
                Some((row, min_ratio)) if ratio >= min_ratio - self.tolerance => {
                    // Tie: Bland needs the smallest leaving index, otherwise prefer the larger pivot
                    let replace = match rule {
                        PivotRule::Bland => tableau.basic_vars[i] < tableau.basic_vars[row],
                        PivotRule::Dantzig => val > tableau.data[row][col],
                    };
                    if replace { Some((i, ratio)) } else { Some((row, min_ratio)) }
                }
                _ => Some((i, ratio)),
            };
        }

        best.map(|(row, _)| row)
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        let n_cols = tableau.n_cols();

        // Update basic variable
        tableau.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        for i in 0..n_rows {
            if i != row {
                let factor = tableau.data[i][col];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n_cols {
                    tableau.data[i][j] -= factor * tableau.data[row][j];
                }
            }
        }
    }

    fn extract_values(&self, tableau: &Tableau, problem: &LpProblem) -> Vec<f64> {
        let n_vars = problem.num_variables();
        let rhs_col = tableau.rhs_col();

        let mut shifted = vec![0.0; n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_vars {
                shifted[basic] = tableau.data[i][rhs_col];
            }
        }

        shifted
            .into_iter()
            .zip(&problem.bounds)
            .map(|(v, b)| {
                let value = v + b.lower;
                // Snap round-off below the lower bound back onto it
                if value < b.lower && b.lower - value <= self.feasibility_tolerance {
                    b.lower
                } else {
                    value
                }
            })
            .collect()
    }

    /// Find which constraints and bounds are violated by a given point
    fn find_violations(&self, problem: &LpProblem, values: &[f64]) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &problem.constraints {
            let lhs: f64 = c.coefficients.iter().zip(values).map(|(a, x)| a * x).sum();
            let allowed = self.feasibility_tolerance * c.rhs.abs().max(1.0);

            let violation = match c.op {
                ConstraintOp::Le if lhs > c.rhs + allowed => {
                    let amt = lhs - c.rhs;
                    Some((amt, format!("{} exceeds maximum of {:.2} by {:.2e}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Ge if lhs < c.rhs - allowed => {
                    let amt = c.rhs - lhs;
                    Some((amt, format!("{} is below minimum of {:.2} by {:.2e}", c.name, c.rhs, amt)))
                }
                ConstraintOp::Eq if (lhs - c.rhs).abs() > allowed => {
                    let amt = (lhs - c.rhs).abs();
                    Some((amt, format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs)))
                }
                _ => None,
            };

            if let Some((violation_amount, description)) = violation {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        for ((name, b), &value) in problem.variables.iter().zip(&problem.bounds).zip(values) {
            let allowed = self.feasibility_tolerance * b.lower.abs().max(1.0);
            if value < b.lower - allowed {
                violations.push(ConstraintViolation {
                    constraint: format!("{} lower bound", name),
                    required: b.lower,
                    actual: value,
                    violation_amount: b.lower - value,
                    description: format!("{} is below its lower bound {:.2}", name, b.lower),
                });
            }
            if let Some(upper) = b.upper {
                if value > upper + self.feasibility_tolerance * upper.abs().max(1.0) {
                    violations.push(ConstraintViolation {
                        constraint: format!("{} upper bound", name),
                        required: upper,
                        actual: value,
                        violation_amount: value - upper,
                        description: format!("{} is above its upper bound {:.2}", name, upper),
                    });
                }
            }
        }

        // Sort by violation amount (worst first)
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        violations
    }
}

/// A constraint row after shifting variables onto their lower bounds and
/// making the right-hand side non-negative
struct StandardRow {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

fn standard_rows(problem: &LpProblem) -> Vec<StandardRow> {
    let n_vars = problem.num_variables();
    let mut rows = Vec::with_capacity(problem.num_constraints());

    // Substitute x = x' + lower so every shifted variable is >= 0
    for c in &problem.constraints {
        let shift: f64 = c
            .coefficients
            .iter()
            .zip(&problem.bounds)
            .map(|(a, b)| a * b.lower)
            .sum();
        rows.push(StandardRow {
            coefficients: c.coefficients.clone(),
            op: c.op,
            rhs: c.rhs - shift,
        });
    }

    for (j, b) in problem.bounds.iter().enumerate() {
        if let Some(upper) = b.upper.filter(|u| u.is_finite()) {
            let mut coefficients = vec![0.0; n_vars];
            coefficients[j] = 1.0;
            rows.push(StandardRow {
                coefficients,
                op: ConstraintOp::Le,
                rhs: upper - b.lower,
            });
        }
    }

    for row in &mut rows {
        if row.rhs < 0.0 {
            row.rhs = -row.rhs;
            row.op = row.op.flipped();
            for a in &mut row.coefficients {
                *a = -*a;
            }
        }
    }

    rows
}

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    /// Magnitude used to scale the phase 1 feasibility check
    rhs_scale: f64,
}

impl Tableau {
    fn new(problem: &LpProblem, rows: &[StandardRow]) -> Self {
        let n_vars = problem.num_variables();
        let n_constraints = rows.len();

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for row in rows {
            match row.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let mut data = vec![vec![0.0; total_cols]; n_constraints + 1];
        let mut basic_vars = vec![0; n_constraints];

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;

        for (i, row) in rows.iter().enumerate() {
            data[i][..n_vars].copy_from_slice(&row.coefficients);
            data[i][total_cols - 1] = row.rhs;

            match row.op {
                ConstraintOp::Le => {
                    data[i][slack_idx] = 1.0;
                    basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Simplex maximizes, so for minimization we negate the coefficients
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            data[n_constraints][j] = if problem.objective.minimize { -coef } else { coef };
        }

        let rhs_scale = rows.iter().map(|r| r.rhs).fold(1.0, f64::max);

        Self {
            data,
            basic_vars,
            n_vars,
            n_slack,
            n_artificial,
            rhs_scale,
        }
    }

    fn n_constraints(&self) -> usize {
        self.basic_vars.len()
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    fn art_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}
