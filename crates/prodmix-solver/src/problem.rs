use thiserror::Error;

/// Represents a linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
    /// Bounds for each variable, same order as `variables`
    pub bounds: Vec<VarBounds>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    /// The operator obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

/// Bounds on a single variable. The lower bound must be finite; `None` means
/// no upper bound.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBounds {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Default for VarBounds {
    fn default() -> Self {
        Self::non_negative()
    }
}

impl VarBounds {
    /// `[0, +inf)`
    pub fn non_negative() -> Self {
        Self {
            lower: 0.0,
            upper: None,
        }
    }

    pub fn new(lower: f64, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }
}

/// Structural problems detected before the simplex method runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Objective has {found} coefficients but the problem has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {name} has {found} coefficients but the problem has {expected} variables")]
    ConstraintLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Expected {expected} variable bounds, found {found}")]
    BoundsLength { expected: usize, found: usize },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
    #[error("Invalid bounds for {name}: lower {lower}, upper {upper}")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
}

impl LpProblem {
    /// Create a problem whose variables are all bounded to `[0, +inf)`
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                minimize: true,
            },
            constraints: Vec::new(),
            bounds: vec![VarBounds::non_negative(); n],
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Replace the bounds of the variable at `index`.
    ///
    /// Panics if `index` is not a variable of this problem.
    pub fn set_bounds(&mut self, index: usize, bounds: VarBounds) {
        self.bounds[index] = bounds;
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check dimensions and finiteness of every coefficient
    pub fn validate(&self) -> Result<(), ProblemError> {
        let n = self.num_variables();

        if self.objective.coefficients.len() != n {
            return Err(ProblemError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        if self.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ProblemError::ConstraintLength {
                    name: c.name.clone(),
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|v| !v.is_finite()) {
                return Err(ProblemError::NonFinite(c.name.clone()));
            }
        }

        if self.bounds.len() != n {
            return Err(ProblemError::BoundsLength {
                expected: n,
                found: self.bounds.len(),
            });
        }
        for (name, b) in self.variables.iter().zip(&self.bounds) {
            if !b.lower.is_finite() {
                return Err(ProblemError::NonFinite(format!("lower bound of {}", name)));
            }
            if let Some(upper) = b.upper {
                if upper.is_nan() || upper < b.lower {
                    return Err(ProblemError::InvalidBounds {
                        name: name.clone(),
                        lower: b.lower,
                        upper,
                    });
                }
            }
        }

        Ok(())
    }

    /// Objective value at `values`, using the coefficients as given
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}
