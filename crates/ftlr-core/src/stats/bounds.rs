use crate::matrix::Matrix;
use crate::regression::fiterror::{DivisionError, FitResult};

/// `(x - xmin) / (xmax - xmin)`, refusing degenerate bounds up front.
pub fn normalize_scalar(x: f64, xmin: f64, xmax: f64) -> Result<f64, DivisionError> {
    Ok(Bounds::new(xmin, xmax)?.normalize(x))
}

/// Feature range used to rescale mileage into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
}

impl Bounds {
    pub fn new(xmin: f64, xmax: f64) -> Result<Self, DivisionError> {
        // also rejects NaN
        if !(xmin < xmax) || !(xmax - xmin).is_finite() {
            return Err(DivisionError::DegenerateBounds { xmin, xmax });
        }
        Ok(Self { xmin, xmax })
    }

    /// Bounds of the raw feature column. A column holding a single distinct
    /// value has no usable range.
    pub fn from_features(features: &Matrix) -> FitResult<Self> {
        let xmin = features.min()?;
        let xmax = features.max()?;
        Ok(Self::new(xmin, xmax)?)
    }

    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.xmin) / (self.xmax - self.xmin)
    }

    pub fn normalize_matrix(&self, features: &Matrix) -> Matrix {
        features.map(|x| self.normalize(x))
    }

    pub fn denormalize(&self, x: f64) -> f64 {
        self.xmin + x * (self.xmax - self.xmin)
    }

    /// `count` evenly spaced points from `xmin` to `xmax` inclusive.
    pub fn linspace(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.xmin],
            _ => {
                let step = (self.xmax - self.xmin) / (count - 1) as f64;
                (0..count).map(|i| self.xmin + i as f64 * step).collect()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::fiterror::{FitError, ShapeError};

    #[test]
    fn endpoints_map_to_unit_interval() {
        let (xmin, xmax) = (22_899.0, 240_000.0);
        assert_eq!(normalize_scalar(xmin, xmin, xmax).unwrap(), 0.0);
        assert_eq!(normalize_scalar(xmax, xmin, xmax).unwrap(), 1.0);
        assert_eq!(normalize_scalar(5.0, 0.0, 10.0).unwrap(), 0.5);
    }

    #[test]
    fn equal_bounds_are_rejected() {
        assert_eq!(
            normalize_scalar(3.0, 7.0, 7.0),
            Err(DivisionError::DegenerateBounds { xmin: 7.0, xmax: 7.0 })
        );
        assert!(Bounds::new(2.0, 1.0).is_err());
        assert!(Bounds::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn single_valued_column() {
        let features = Matrix::column(vec![5.0, 5.0, 5.0]);
        assert!(matches!(
            Bounds::from_features(&features),
            Err(FitError::Division(DivisionError::DegenerateBounds { .. }))
        ));
        assert_eq!(
            Bounds::from_features(&Matrix::empty()),
            Err(FitError::Shape(ShapeError::Empty("min")))
        );
    }

    #[test]
    fn normalize_matrix_and_back() {
        let features = Matrix::column(vec![10.0, 20.0, 15.0]);
        let bounds = Bounds::from_features(&features).unwrap();
        let normalized = bounds.normalize_matrix(&features);
        assert_eq!(normalized.values(), &[0.0, 1.0, 0.5]);
        assert_eq!(bounds.denormalize(0.5), 15.0);
    }

    #[test]
    fn linspace_hits_both_ends() {
        let bounds = Bounds::new(0.0, 99.0).unwrap();
        let points = bounds.linspace(100);
        assert_eq!(points.len(), 100);
        assert_eq!(points[0], 0.0);
        assert_eq!(points[99], 99.0);
        assert_eq!(bounds.linspace(1), vec![0.0]);
    }
}
