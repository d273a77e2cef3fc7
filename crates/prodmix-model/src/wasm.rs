//! WASM bindings for prodmix
//!
//! JavaScript-friendly entry points for a browser form and canvas. Inputs
//! are plain objects with the `ProductionInputs` field names; missing fields
//! take their defaults.

use wasm_bindgen::prelude::*;

use crate::inputs::ProductionInputs;
use crate::model::LpModel;
use crate::optimize;
use crate::region::{self, DEFAULT_SAMPLES, FeasibleRegionCurves};
use crate::report::Report;

fn inputs_from_js(value: JsValue) -> Result<ProductionInputs, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ProductionInputs::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn build(inputs: &ProductionInputs) -> Result<LpModel, JsValue> {
    LpModel::build(inputs).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The default inputs, for pre-filling a form
#[wasm_bindgen(js_name = defaultInputs)]
pub fn default_inputs() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&ProductionInputs::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Solve and return `{ status, quantity_a?, quantity_b?, total_profit? }`
#[wasm_bindgen]
pub fn solve(inputs: JsValue) -> Result<JsValue, JsValue> {
    let model = build(&inputs_from_js(inputs)?)?;
    let solution = optimize::solve(&model);
    serde_wasm_bindgen::to_value(&solution).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Boundary curves and envelope over `[0, x_max]` (material capacity when omitted)
#[wasm_bindgen(js_name = feasibleRegion)]
pub fn feasible_region(inputs: JsValue, x_max: Option<f64>) -> Result<JsValue, JsValue> {
    let model = build(&inputs_from_js(inputs)?)?;
    let x_max = x_max.unwrap_or_else(|| FeasibleRegionCurves::default_x_max(&model));
    let curves = FeasibleRegionCurves::derive(&model, x_max).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&curves).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Full report: inputs, solution, curves and polygon
#[wasm_bindgen]
pub fn report(inputs: JsValue) -> Result<JsValue, JsValue> {
    let report = Report::compute(&inputs_from_js(inputs)?).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Sample abscissae as a typed array, for canvas libraries that take columns
#[wasm_bindgen(js_name = regionXs)]
pub fn region_xs(x_max: f64, samples: Option<usize>) -> js_sys::Float64Array {
    let xs = region::linspace(0.0, x_max, samples.unwrap_or(DEFAULT_SAMPLES));
    js_sys::Float64Array::from(xs.as_slice())
}
