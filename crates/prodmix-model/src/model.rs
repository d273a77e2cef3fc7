use prodmix_solver::{ConstraintOp, LpProblem, VarBounds};
use thiserror::Error;
use tracing::debug;

use crate::inputs::ProductionInputs;

/// Names of the two decision variables, in column order
pub const PRODUCT_NAMES: [&str; 2] = ["product_a", "product_b"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("At least {min} samples are needed to draw a curve, got {found}")]
    TooFewSamples { min: usize, found: usize },
}

/// A limited resource, one constraint row each
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Material,
    Time,
}

impl Resource {
    /// Both resources in constraint-row order
    pub const ALL: [Resource; 2] = [Resource::Material, Resource::Time];

    pub fn row(self) -> usize {
        match self {
            Resource::Material => 0,
            Resource::Time => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Resource::Material => "material",
            Resource::Time => "time",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Material => "Material constraint",
            Resource::Time => "Time constraint",
        }
    }
}

/// The production problem in minimization form:
///
/// ```text
/// minimize    -profit_a * a - profit_b * b
/// subject to  A [a, b] <= capacities
///             a, b >= 0
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpModel {
    objective: [f64; 2],
    constraints: [[f64; 2]; 2],
    capacities: [f64; 2],
}

impl LpModel {
    /// Build the model from user inputs. Only non-finite values are rejected.
    pub fn build(inputs: &ProductionInputs) -> Result<Self, ModelError> {
        if let Some(&(field, value)) = inputs.fields().iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::NonFinite { field, value });
        }

        let model = Self {
            objective: [-inputs.profit_a, -inputs.profit_b],
            constraints: [
                [inputs.consume_a_material, inputs.consume_b_material],
                [inputs.consume_a_time, inputs.consume_b_time],
            ],
            capacities: [inputs.material_capacity, inputs.time_capacity],
        };
        debug!(?model, "built production model");
        Ok(model)
    }

    /// Cost vector (negated unit profits)
    pub fn objective(&self) -> [f64; 2] {
        self.objective
    }

    /// Unit profits, recovered from the cost vector
    pub fn profits(&self) -> [f64; 2] {
        [-self.objective[0], -self.objective[1]]
    }

    /// Constraint matrix, rows in [`Resource::ALL`] order
    pub fn constraint_matrix(&self) -> [[f64; 2]; 2] {
        self.constraints
    }

    /// Per-unit consumption of `resource` by product A and product B
    pub fn coefficients(&self, resource: Resource) -> [f64; 2] {
        self.constraints[resource.row()]
    }

    pub fn capacities(&self) -> [f64; 2] {
        self.capacities
    }

    pub fn capacity(&self, resource: Resource) -> f64 {
        self.capacities[resource.row()]
    }

    /// Both variables live in `[0, +inf)`
    pub fn bounds(&self) -> [VarBounds; 2] {
        [VarBounds::non_negative(); 2]
    }

    /// Profit earned by producing the given quantities
    pub fn profit(&self, quantity_a: f64, quantity_b: f64) -> f64 {
        let [pa, pb] = self.profits();
        pa * quantity_a + pb * quantity_b
    }

    /// Amount of `resource` consumed by the given quantities
    pub fn usage(&self, resource: Resource, quantity_a: f64, quantity_b: f64) -> f64 {
        let [a, b] = self.coefficients(resource);
        a * quantity_a + b * quantity_b
    }

    /// Express the model as a general LP for the simplex solver
    pub fn to_lp_problem(&self) -> LpProblem {
        let mut problem = LpProblem::new(PRODUCT_NAMES.iter().map(|s| s.to_string()).collect());
        problem.set_objective(self.objective.to_vec(), true);
        for resource in Resource::ALL {
            problem.add_constraint(
                resource.name(),
                self.coefficients(resource).to_vec(),
                ConstraintOp::Le,
                self.capacity(resource),
            );
        }
        for (j, bounds) in self.bounds().into_iter().enumerate() {
            problem.set_bounds(j, bounds);
        }
        problem
    }
}
