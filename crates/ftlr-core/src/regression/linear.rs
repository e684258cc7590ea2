use crate::matrix::Matrix;
use crate::regression::fiterror::{DivisionError, FitError, FitResult, ShapeError};
use crate::stats::{self, LinReg};

const THETA_SHAPE: (usize, usize) = (2, 1);

/// Pairs every normalized feature with a bias term: row `i` is `[1.0, x_i]`,
/// matching theta's `[intercept, slope]` order.
pub fn design_matrix(normalized: &Matrix) -> FitResult<Matrix> {
    if normalized.cols() != 1 {
        return Err(ShapeError::Unexpected {
            op: "design_matrix",
            expected: (normalized.rows(), 1),
            found: normalized.shape(),
        }
        .into());
    }
    let bias = Matrix::filled(normalized.rows(), 1, 1.0);
    Ok(bias.concat_columns(normalized)?)
}

fn check_theta(theta: &Matrix) -> Result<(), ShapeError> {
    if theta.shape() != THETA_SHAPE {
        return Err(ShapeError::Unexpected {
            op: "theta",
            expected: THETA_SHAPE,
            found: theta.shape(),
        });
    }
    Ok(())
}

fn check_problem(x: &Matrix, y: &Matrix, theta: &Matrix) -> FitResult<()> {
    check_theta(theta)?;
    if x.cols() != THETA_SHAPE.0 {
        return Err(
            ShapeError::Mismatch { op: "design matrix", left: x.shape(), right: theta.shape() }
                .into(),
        );
    }
    if y.shape() != (x.rows(), 1) {
        return Err(ShapeError::Mismatch { op: "targets", left: x.shape(), right: y.shape() }.into());
    }
    if x.is_empty() {
        return Err(DivisionError::NoObservations.into());
    }
    Ok(())
}

fn check_learning_rate(learning_rate: f64) -> FitResult<()> {
    if !learning_rate.is_finite() || learning_rate <= 0.0 {
        return Err(FitError::LearningRate(learning_rate));
    }
    Ok(())
}

/// `theta0 + theta1 * x` for one already normalized input.
pub fn predict_scalar(x_normalized: f64, theta: &Matrix) -> FitResult<f64> {
    Ok(LinReg::from_theta(theta)?.calculate(x_normalized))
}

/// `X * theta` for a whole design matrix.
pub fn predict_matrix(x: &Matrix, theta: &Matrix) -> FitResult<Matrix> {
    check_theta(theta)?;
    Ok(x.multiply(theta)?)
}

/// Mean squared error halved: `(1 / 2m) * sum((X * theta - y)^2)`.
pub fn cost(x: &Matrix, y: &Matrix, theta: &Matrix) -> FitResult<f64> {
    check_problem(x, y, theta)?;
    let m = x.rows() as f64;
    let errors = predict_matrix(x, theta)?.subtract(y)?;
    Ok((1.0 / (2.0 * m)) * errors.square().sum())
}

/// `X^T * (X * theta - y) * (1 / m)`, shaped like theta.
pub fn gradient(x: &Matrix, y: &Matrix, theta: &Matrix) -> FitResult<Matrix> {
    check_problem(x, y, theta)?;
    let m = x.rows() as f64;
    let errors = predict_matrix(x, theta)?.subtract(y)?;
    Ok(x.transpose().multiply(&errors)?.scale(1.0 / m))
}

fn step(x: &Matrix, y: &Matrix, theta: &Matrix, learning_rate: f64) -> FitResult<Matrix> {
    Ok(theta.subtract(&gradient(x, y, theta)?.scale(learning_rate))?)
}

fn check_converged(theta: &Matrix) -> FitResult<()> {
    if theta.iter().all(f64::is_finite) {
        Ok(())
    } else {
        Err(FitError::NonFinite("theta diverged, lower the learning rate"))
    }
}

/// Runs exactly `iterations` batch updates
/// `theta := theta - learning_rate * gradient` and returns the last theta.
pub fn gradient_descent(
    x: &Matrix,
    y: &Matrix,
    theta: &Matrix,
    learning_rate: f64,
    iterations: usize,
) -> FitResult<Matrix> {
    check_learning_rate(learning_rate)?;
    check_problem(x, y, theta)?;

    let mut theta = theta.clone();
    for _ in 0..iterations {
        theta = step(x, y, &theta, learning_rate)?;
    }
    check_converged(&theta)?;
    Ok(theta)
}

/// Result of a descent that kept track of its cost.
#[derive(Clone, Debug, PartialEq)]
pub struct Descent {
    pub theta: Matrix,
    /// Cost before each update followed by the cost of the final theta,
    /// `iterations + 1` entries in total.
    pub costs: Vec<f64>,
}

/// Gradient descent with its two hyperparameters fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearRegression {
    iterations: usize,
    learning_rate: f64,
}

impl LinearRegression {
    pub const DEFAULT_ITERATIONS: usize = 1_000;
    pub const DEFAULT_LEARNING_RATE: f64 = 0.07;

    pub fn new(iterations: usize, learning_rate: f64) -> FitResult<Self> {
        check_learning_rate(learning_rate)?;
        Ok(Self { iterations, learning_rate })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn fit(&self, x: &Matrix, y: &Matrix, theta: &Matrix) -> FitResult<Matrix> {
        gradient_descent(x, y, theta, self.learning_rate, self.iterations)
    }

    /// Same updates as [`LinearRegression::fit`], recording the cost curve.
    pub fn fit_with_history(&self, x: &Matrix, y: &Matrix, theta: &Matrix) -> FitResult<Descent> {
        check_problem(x, y, theta)?;

        let mut costs = Vec::with_capacity(self.iterations + 1);
        let mut theta = theta.clone();
        for _ in 0..self.iterations {
            costs.push(cost(x, y, &theta)?);
            theta = step(x, y, &theta, self.learning_rate)?;
        }
        check_converged(&theta)?;
        costs.push(cost(x, y, &theta)?);

        Ok(Descent { theta, costs })
    }

    pub fn r_squared(&self, y: &Matrix, predictions: &Matrix) -> FitResult<f64> {
        stats::r_squared(y, predictions)
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self { iterations: Self::DEFAULT_ITERATIONS, learning_rate: Self::DEFAULT_LEARNING_RATE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn problem(xs: &[f64], ys: &[f64]) -> (Matrix, Matrix) {
        let x = design_matrix(&Matrix::column(xs.to_vec())).unwrap();
        (x, Matrix::column(ys.to_vec()))
    }

    fn zeros() -> Matrix {
        Matrix::column(vec![0.0, 0.0])
    }

    #[test]
    fn design_matrix_puts_bias_first() {
        let x = design_matrix(&Matrix::column(vec![0.2, 0.8])).unwrap();
        assert_eq!(x.to_rows(), vec![vec![1.0, 0.2], vec![1.0, 0.8]]);
        assert!(design_matrix(&Matrix::filled(2, 2, 0.0)).is_err());
    }

    #[test]
    fn scalar_and_matrix_predictions_agree() {
        let theta = Matrix::column(vec![3.0, -2.0]);
        let (x, _) = problem(&[0.0, 0.5, 1.0], &[0.0, 0.0, 0.0]);
        let bulk = predict_matrix(&x, &theta).unwrap();
        assert_eq!(bulk.values(), &[3.0, 2.0, 1.0]);
        assert_eq!(predict_scalar(0.5, &theta).unwrap(), 2.0);
    }

    #[test]
    fn theta_shape_is_enforced() {
        let (x, y) = problem(&[0.0, 1.0], &[1.0, 2.0]);
        let bad = Matrix::column(vec![1.0, 2.0, 3.0]);
        assert!(matches!(predict_scalar(0.5, &bad), Err(FitError::Shape(_))));
        assert!(matches!(cost(&x, &y, &bad), Err(FitError::Shape(_))));
        assert!(matches!(gradient(&x, &y, &bad), Err(FitError::Shape(_))));
    }

    #[test]
    fn targets_must_match_rows() {
        let (x, _) = problem(&[0.0, 1.0], &[1.0, 2.0]);
        let y = Matrix::column(vec![1.0, 2.0, 3.0]);
        assert!(matches!(cost(&x, &y, &zeros()), Err(FitError::Shape(_))));
    }

    #[test]
    fn cost_and_gradient_by_hand() {
        // y = 1 + 2x, theta = 0 => errors are -y
        let (x, y) = problem(&[0.0, 1.0], &[1.0, 3.0]);
        assert_abs_diff_eq!(cost(&x, &y, &zeros()).unwrap(), (1.0 + 9.0) / 4.0);
        let g = gradient(&x, &y, &zeros()).unwrap();
        assert_eq!(g.shape(), (2, 1));
        assert_eq!(g.values(), &[-2.0, -1.5]);
        assert_eq!(cost(&x, &y, &Matrix::column(vec![1.0, 2.0])).unwrap(), 0.0);
    }

    #[test]
    fn zero_iterations_returns_input() {
        let (x, y) = problem(&[0.0, 0.5, 1.0], &[1.0, 2.0, 3.0]);
        let theta = Matrix::column(vec![0.3, -0.7]);
        assert_eq!(gradient_descent(&x, &y, &theta, 0.1, 0).unwrap(), theta);
    }

    #[test]
    fn learning_rate_is_validated() {
        let (x, y) = problem(&[0.0, 1.0], &[1.0, 2.0]);
        for lr in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                gradient_descent(&x, &y, &zeros(), lr, 10),
                Err(FitError::LearningRate(_))
            ));
            assert!(LinearRegression::new(10, lr).is_err());
        }
    }

    #[test]
    fn divergence_is_reported() {
        let (x, y) = problem(&[0.0, 0.5, 1.0], &[1.0, 2.0, 3.0]);
        let err = gradient_descent(&x, &y, &zeros(), 1e3, 1_000).unwrap_err();
        assert!(matches!(err, FitError::NonFinite(_)));
    }

    #[test]
    fn descent_is_reproducible() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 4.0 - 1.5 * x + (x * 7.0).sin() * 0.1).collect();
        let (x, y) = problem(&xs, &ys);
        let model = LinearRegression::new(250, 0.07).unwrap();
        let a = model.fit(&x, &y, &zeros()).unwrap();
        let b = model.fit(&x, &y, &zeros()).unwrap();
        assert_eq!(a.values(), b.values());
        assert_eq!(model.fit_with_history(&x, &y, &zeros()).unwrap().theta, a);
    }

    #[test]
    fn cost_never_increases_and_theta_converges() {
        let (intercept, slope) = (2.0, 3.0);
        let mut rng = StdRng::seed_from_u64(42);
        let xs: Vec<f64> = (0..100).map(|i| i as f64 / 99.0).collect();
        let ys: Vec<f64> =
            xs.iter().map(|x| intercept + slope * x + rng.random_range(-0.05..0.05)).collect();
        let (x, y) = problem(&xs, &ys);

        let model = LinearRegression::new(1_000, 0.1).unwrap();
        let descent = model.fit_with_history(&x, &y, &zeros()).unwrap();

        assert_eq!(descent.costs.len(), 1_001);
        for pair in descent.costs.windows(2) {
            assert!(pair[1] <= pair[0], "cost went up: {} -> {}", pair[0], pair[1]);
        }
        let fitted = LinReg::from_theta(&descent.theta).unwrap();
        assert_abs_diff_eq!(fitted.intercept, intercept, epsilon = 0.05);
        assert_abs_diff_eq!(fitted.slope, slope, epsilon = 0.05);
    }

    #[test]
    fn approaches_least_squares() {
        let xs = [0.0, 0.1, 0.35, 0.5, 0.8, 1.0];
        let ys = [10.0, 9.1, 7.9, 6.2, 4.4, 3.0];
        let (x, y) = problem(&xs, &ys);
        let theta = LinearRegression::new(20_000, 0.5).unwrap().fit(&x, &y, &zeros()).unwrap();
        let optimum = LinReg::train(&xs, &ys).unwrap();
        let fitted = LinReg::from_theta(&theta).unwrap();
        assert_abs_diff_eq!(fitted.intercept, optimum.intercept, epsilon = 1e-6);
        assert_abs_diff_eq!(fitted.slope, optimum.slope, epsilon = 1e-6);
    }
}
