use tracing::info;

use crate::inputs::ProductionInputs;
use crate::model::{LpModel, ModelError, Resource};
use crate::optimize::{self, ProductionSolution};
use crate::polygon::FeasiblePolygon;
use crate::region::{DEFAULT_SAMPLES, FeasibleRegionCurves};

pub const X_AXIS_LABEL: &str = "Units of product A";
pub const Y_AXIS_LABEL: &str = "Units of product B";
pub const REGION_LABEL: &str = "Feasible region";
pub const OPTIMUM_LABEL: &str = "Optimal solution";

/// Receiver for the plot of a [`Report`].
///
/// Implemented by whatever draws the chart; the report only hands over
/// coordinates and labels.
pub trait PlotSink {
    type Error;

    fn axes(&mut self, x_label: &str, y_label: &str) -> Result<(), Self::Error>;

    /// A boundary line
    fn line(&mut self, label: &str, points: &[[f64; 2]]) -> Result<(), Self::Error>;

    /// The area between the x axis and `points`
    fn fill_under(&mut self, label: &str, points: &[[f64; 2]]) -> Result<(), Self::Error>;

    /// A highlighted point
    fn marker(&mut self, label: &str, point: [f64; 2]) -> Result<(), Self::Error>;
}

/// Everything computed from one set of inputs
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub inputs: ProductionInputs,
    pub solution: ProductionSolution,
    pub curves: FeasibleRegionCurves,
    pub polygon: FeasiblePolygon,
}

impl Report {
    /// Build, solve and derive curves over `[0, material_capacity]`
    pub fn compute(inputs: &ProductionInputs) -> Result<Self, ModelError> {
        Self::compute_with(inputs, None, DEFAULT_SAMPLES)
    }

    pub fn compute_with(inputs: &ProductionInputs, x_max: Option<f64>, samples: usize) -> Result<Self, ModelError> {
        let model = LpModel::build(inputs)?;
        let solution = optimize::solve(&model);

        let x_max = x_max.unwrap_or_else(|| FeasibleRegionCurves::default_x_max(&model));
        let curves = FeasibleRegionCurves::with_resolution(&model, x_max, samples)?;
        let polygon = FeasiblePolygon::from_model(&model);

        info!(status = solution.status_label(), "production report computed");
        Ok(Self {
            inputs: *inputs,
            solution,
            curves,
            polygon,
        })
    }

    /// Hand the plot to `sink`. The optimum marker is only drawn when solved.
    pub fn render<S: PlotSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.axes(X_AXIS_LABEL, Y_AXIS_LABEL)?;
        for resource in Resource::ALL {
            sink.line(resource.label(), &self.curves.curve(resource).points)?;
        }
        sink.fill_under(REGION_LABEL, &self.curves.envelope)?;
        if let Some(point) = self.solution.optimal_point() {
            sink.marker(OPTIMUM_LABEL, point)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Call {
        Axes(String, String),
        Line(String, usize),
        Fill(String, usize),
        Marker(String, [f64; 2]),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl PlotSink for Recorder {
        type Error = std::convert::Infallible;

        fn axes(&mut self, x_label: &str, y_label: &str) -> Result<(), Self::Error> {
            self.calls.push(Call::Axes(x_label.to_string(), y_label.to_string()));
            Ok(())
        }

        fn line(&mut self, label: &str, points: &[[f64; 2]]) -> Result<(), Self::Error> {
            self.calls.push(Call::Line(label.to_string(), points.len()));
            Ok(())
        }

        fn fill_under(&mut self, label: &str, points: &[[f64; 2]]) -> Result<(), Self::Error> {
            self.calls.push(Call::Fill(label.to_string(), points.len()));
            Ok(())
        }

        fn marker(&mut self, label: &str, point: [f64; 2]) -> Result<(), Self::Error> {
            self.calls.push(Call::Marker(label.to_string(), point));
            Ok(())
        }
    }

    #[test]
    fn test_render_solved_report() {
        let report = Report::compute(&ProductionInputs::default()).unwrap();
        let mut sink = Recorder::default();
        report.render(&mut sink).unwrap();

        assert_eq!(sink.calls.len(), 5);
        assert_eq!(sink.calls[0], Call::Axes(X_AXIS_LABEL.to_string(), Y_AXIS_LABEL.to_string()));
        assert_eq!(sink.calls[1], Call::Line("Material constraint".to_string(), DEFAULT_SAMPLES));
        assert_eq!(sink.calls[2], Call::Line("Time constraint".to_string(), DEFAULT_SAMPLES));
        assert_eq!(sink.calls[3], Call::Fill(REGION_LABEL.to_string(), DEFAULT_SAMPLES));
        let Call::Marker(label, [x, y]) = &sink.calls[4] else {
            panic!("expected marker, got {:?}", sink.calls[4]);
        };
        assert_eq!(label, OPTIMUM_LABEL);
        assert!((x - 40.0).abs() < 1e-6 && (y - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_failed_solve_still_renders_curves() {
        let inputs = ProductionInputs {
            material_capacity: -10.0,
            ..ProductionInputs::default()
        };
        let report = Report::compute_with(&inputs, Some(60.0), 50).unwrap();
        assert_eq!(report.solution, ProductionSolution::Infeasible);
        assert!(report.polygon.is_empty());

        let mut sink = Recorder::default();
        report.render(&mut sink).unwrap();
        assert_eq!(sink.calls.len(), 4);
        assert!(!sink.calls.iter().any(|c| matches!(c, Call::Marker(..))));
        assert_eq!(report.curves.xs().last(), Some(60.0));
    }

    #[test]
    fn test_unusable_sampling_is_rejected() {
        let inputs = ProductionInputs::default();
        assert_eq!(
            Report::compute_with(&inputs, None, 0),
            Err(ModelError::TooFewSamples { min: 2, found: 0 })
        );
        assert!(matches!(
            Report::compute_with(&inputs, Some(f64::NAN), DEFAULT_SAMPLES),
            Err(ModelError::NonFinite { field: "x_max", .. })
        ));
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let inputs = ProductionInputs {
            profit_a: f64::NAN,
            ..ProductionInputs::default()
        };
        assert!(matches!(
            Report::compute(&inputs),
            Err(ModelError::NonFinite { field: "profit_a", .. })
        ));
    }
}
