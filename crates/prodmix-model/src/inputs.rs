use thiserror::Error;

/// The scalars captured from the user: per-unit profits, per-unit resource
/// consumption, and the total capacity of each resource.
///
/// Values are not sanitized. Negative consumption or capacity is passed on
/// to the model unchanged and surfaces as an infeasible or unbounded solve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionInputs {
    /// Profit per unit of product A
    pub profit_a: f64,
    /// Profit per unit of product B
    pub profit_b: f64,
    /// Raw material consumed per unit of product A
    pub consume_a_material: f64,
    /// Raw material consumed per unit of product B
    pub consume_b_material: f64,
    /// Production hours consumed per unit of product A
    pub consume_a_time: f64,
    /// Production hours consumed per unit of product B
    pub consume_b_time: f64,
    /// Total raw material available
    pub material_capacity: f64,
    /// Total production hours available
    pub time_capacity: f64,
}

impl Default for ProductionInputs {
    fn default() -> Self {
        Self {
            profit_a: 5000.0,
            profit_b: 3000.0,
            consume_a_material: 2.0,
            consume_b_material: 1.0,
            consume_a_time: 1.5,
            consume_b_time: 1.0,
            material_capacity: 100.0,
            time_capacity: 80.0,
        }
    }
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid inputs: {0}")]
    Parse(String),
}

impl ProductionInputs {
    /// Every field paired with its name, in declaration order
    pub fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("profit_a", self.profit_a),
            ("profit_b", self.profit_b),
            ("consume_a_material", self.consume_a_material),
            ("consume_b_material", self.consume_b_material),
            ("consume_a_time", self.consume_a_time),
            ("consume_b_time", self.consume_b_time),
            ("material_capacity", self.material_capacity),
            ("time_capacity", self.time_capacity),
        ]
    }

    /// Parse inputs from JSON. Missing fields take their default values.
    #[cfg(feature = "serde")]
    pub fn from_json(source: &str) -> Result<Self, InputError> {
        serde_json::from_str(source).map_err(|e| InputError::Parse(e.to_string()))
    }

    /// Multiply both capacities by `factor`, leaving everything else unchanged
    pub fn with_scaled_capacities(mut self, factor: f64) -> Self {
        self.material_capacity *= factor;
        self.time_capacity *= factor;
        self
    }
}
