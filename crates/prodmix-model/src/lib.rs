pub mod inputs;
pub mod model;
pub mod optimize;
pub mod polygon;
pub mod region;
pub mod report;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use inputs::{InputError, ProductionInputs};
pub use model::{LpModel, ModelError, PRODUCT_NAMES, Resource};
pub use optimize::{ProductionSolution, solve, solve_with};
pub use polygon::FeasiblePolygon;
pub use region::{BoundaryCurve, BoundaryKind, DEFAULT_SAMPLES, FeasibleRegionCurves, MIN_SAMPLES, linspace};
pub use report::{OPTIMUM_LABEL, PlotSink, REGION_LABEL, Report, X_AXIS_LABEL, Y_AXIS_LABEL};
