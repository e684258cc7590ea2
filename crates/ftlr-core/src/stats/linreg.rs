use crate::matrix::Matrix;
use crate::regression::fiterror::{DivisionError, FitError, FitResult, ShapeError};
use crate::stats::bounds::Bounds;
use std::fmt;

/// Intercept and slope of a straight line, the scalar view of theta.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinReg {
    pub intercept: f64,
    pub slope: f64,
}

impl fmt::Display for LinReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "y = {} + {} * x", self.intercept, self.slope)
    }
}

impl Default for LinReg {
    fn default() -> Self {
        Self::new()
    }
}

impl LinReg {
    pub fn new() -> Self {
        Self { intercept: 0., slope: 0. }
    }
    pub fn calculate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
    pub fn from_val(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    /// Reads a `(2, 1)` theta matrix, intercept first.
    pub fn from_theta(theta: &Matrix) -> Result<Self, ShapeError> {
        match (theta.shape(), theta.values()) {
            ((2, 1), &[intercept, slope]) => Ok(Self { intercept, slope }),
            (found, _) => Err(ShapeError::Unexpected { op: "theta", expected: (2, 1), found }),
        }
    }

    pub fn to_theta(&self) -> Matrix {
        Matrix::column(vec![self.intercept, self.slope])
    }

    /// Re-expresses a line fitted on normalized x in terms of raw x.
    pub fn denormalize(&self, bounds: &Bounds) -> Self {
        let range = bounds.xmax - bounds.xmin;
        let slope = self.slope / range;
        Self { intercept: self.intercept - slope * bounds.xmin, slope }
    }

    /// Ordinary least squares, the optimum gradient descent converges to.
    pub fn train(x: &[f64], y: &[f64]) -> FitResult<Self> {
        if x.len() != y.len() {
            return Err(ShapeError::Mismatch {
                op: "least squares",
                left: (x.len(), 1),
                right: (y.len(), 1),
            }
            .into());
        }
        if x.is_empty() {
            return Err(DivisionError::NoObservations.into());
        }

        let avg_x: f64 = x.iter().sum::<f64>() / x.len() as f64;
        let x_differences_to_average: Vec<f64> = x.iter().map(|value| value - avg_x).collect();

        let ss_xx: f64 = x_differences_to_average.iter().map(|value| value.powi(2)).sum();
        if ss_xx == 0.0 {
            return Err(DivisionError::DegenerateBounds { xmin: x[0], xmax: x[0] }.into());
        }

        let avg_y = y.iter().sum::<f64>() / y.len() as f64;
        let ss_xy: f64 = x_differences_to_average
            .iter()
            .zip(y.iter())
            .map(|(dx, yi)| dx * (yi - avg_y))
            .sum();
        let slope = ss_xy / ss_xx;
        let intercept = avg_y - slope * avg_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(FitError::NonFinite("least squares coefficients"));
        }

        Ok(Self { intercept, slope })
    }
}
