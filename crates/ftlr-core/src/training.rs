use crate::dataset::Dataset;
use crate::matrix::Matrix;
use crate::model_file::ModelParams;
use crate::regression::fiterror::FitResult;
use crate::regression::{design_matrix, predict_matrix, LinearRegression};
use crate::stats::{r_squared, rmse, Bounds, LinReg};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

/// Starting theta: zeros, or values drawn uniformly from `[-1, 1)` with a
/// fixed seed so that runs stay reproducible.
pub fn initial_theta(seed: Option<u64>) -> Matrix {
    match seed {
        None => Matrix::column(vec![0.0, 0.0]),
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            Matrix::column(vec![rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)])
        },
    }
}

/// Everything a training run produced, kept for evaluation and plotting.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub params: ModelParams,
    pub theta: Matrix,
    pub bounds: Bounds,
    /// Mileage rescaled into `[0, 1]`, one row per observation.
    pub normalized: Matrix,
    pub design: Matrix,
    pub costs: Vec<f64>,
}

impl TrainedModel {
    pub fn line(&self) -> LinReg {
        self.params.line()
    }

    pub fn predictions(&self) -> FitResult<Matrix> {
        predict_matrix(&self.design, &self.theta)
    }
}

/// Bounds come from the raw mileage, the features are normalized with them,
/// then paired with the bias column and handed to gradient descent.
pub fn train(
    dataset: &Dataset,
    regression: &LinearRegression,
    theta: &Matrix,
) -> FitResult<TrainedModel> {
    let bounds = Bounds::from_features(dataset.features())?;
    let normalized = bounds.normalize_matrix(dataset.features());
    let design = design_matrix(&normalized)?;
    debug!(
        "training on {} rows, xmin {}, xmax {}, {} iterations at rate {}",
        dataset.len(),
        bounds.xmin,
        bounds.xmax,
        regression.iterations(),
        regression.learning_rate()
    );

    let descent = regression.fit_with_history(&design, dataset.targets(), theta)?;
    let line = LinReg::from_theta(&descent.theta)?;
    info!(
        "training finished: theta0 {:.4}, theta1 {:.4}, final cost {:.4}",
        line.intercept,
        line.slope,
        descent.costs.last().copied().unwrap_or_default()
    );

    Ok(TrainedModel {
        params: ModelParams::from_fit(line, bounds),
        theta: descent.theta,
        bounds,
        normalized,
        design,
        costs: descent.costs,
    })
}

/// Goodness of fit of a trained model on its own dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub r_squared: f64,
    pub rmse: f64,
    /// Closed-form least squares on the same normalized data.
    pub least_squares: LinReg,
}

pub fn evaluate(dataset: &Dataset, model: &TrainedModel) -> FitResult<Evaluation> {
    let predictions = model.predictions()?;
    Ok(Evaluation {
        r_squared: r_squared(dataset.targets(), &predictions)?,
        rmse: rmse(dataset.targets(), &predictions)?,
        least_squares: LinReg::train(model.normalized.values(), dataset.targets().values())?,
    })
}
