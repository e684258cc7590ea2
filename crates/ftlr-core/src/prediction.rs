use crate::model_file::ModelParams;
use crate::regression::fiterror::FitResult;
use crate::regression::predict_scalar;

/// Estimated price for `mileage` km under a persisted model.
pub fn estimate_price(params: &ModelParams, mileage: f64) -> FitResult<f64> {
    let x = params.bounds()?.normalize(mileage);
    predict_scalar(x, &params.theta())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::fiterror::{DivisionError, FitError};
    use approx::assert_abs_diff_eq;

    #[test]
    fn untrained_model_predicts_zero() {
        assert_eq!(estimate_price(&ModelParams::default(), 42_000.0).unwrap(), 0.0);
    }

    #[test]
    fn bounds_map_to_intercept_and_intercept_plus_slope() {
        let params =
            ModelParams { theta0: 8000.0, theta1: -4000.0, xmin: 20_000.0, xmax: 240_000.0 };
        assert_abs_diff_eq!(estimate_price(&params, 20_000.0).unwrap(), 8000.0);
        assert_abs_diff_eq!(estimate_price(&params, 240_000.0).unwrap(), 4000.0);
        assert_abs_diff_eq!(estimate_price(&params, 130_000.0).unwrap(), 6000.0);
    }

    #[test]
    fn degenerate_bounds_are_an_error() {
        let params = ModelParams { theta0: 1.0, theta1: 1.0, xmin: 5.0, xmax: 5.0 };
        assert!(matches!(
            estimate_price(&params, 5.0),
            Err(FitError::Division(DivisionError::DegenerateBounds { .. }))
        ));
    }
}
