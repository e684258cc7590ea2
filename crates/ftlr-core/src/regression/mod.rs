pub mod fiterror;
pub mod linear;

pub use fiterror::{DivisionError, FitError, FitResult, ShapeError};
pub use linear::{
    cost, design_matrix, gradient, gradient_descent, predict_matrix, predict_scalar, Descent,
    LinearRegression,
};
