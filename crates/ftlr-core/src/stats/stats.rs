use crate::matrix::Matrix;
use crate::regression::fiterror::{DivisionError, FitResult, ShapeError};

fn check_pair(op: &'static str, y: &Matrix, y_hat: &Matrix) -> Result<(), ShapeError> {
    if y.shape() != y_hat.shape() {
        return Err(ShapeError::Mismatch { op, left: y.shape(), right: y_hat.shape() });
    }
    if y.is_empty() {
        return Err(ShapeError::Empty(op));
    }
    Ok(())
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant target has no variance to explain and is reported as
/// [`DivisionError::ZeroVariance`].
pub fn r_squared(y: &Matrix, y_hat: &Matrix) -> FitResult<f64> {
    check_pair("r_squared", y, y_hat)?;

    let means = Matrix::filled(y.rows(), y.cols(), y.mean()?);
    let ss_res = y.subtract(y_hat)?.square().sum();
    let ss_tot = y.subtract(&means)?.square().sum();

    if ss_tot == 0.0 {
        return Err(DivisionError::ZeroVariance.into());
    }

    Ok(1.0 - ss_res / ss_tot)
}

pub fn rmse(y: &Matrix, y_hat: &Matrix) -> FitResult<f64> {
    check_pair("rmse", y, y_hat)?;
    let sum_sq = y.subtract(y_hat)?.square().sum();
    Ok((sum_sq / y.rows() as f64).sqrt())
}
