use crate::cmd::cli::parse_mileage;
use crate::dataset::{Dataset, DatasetError};
use crate::model_file::{ModelFileError, ModelParams};
use crate::plot::{self, PlotError};
use crate::prediction::estimate_price;
use crate::regression::{FitError, LinearRegression};
use crate::training::{evaluate, initial_theta, train, TrainedModel};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/* =================== Public configuration types =================== */

#[derive(Debug, Clone)]
pub struct Config {
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Train(Train),
    Predict(Predict),
    Evaluate(Evaluate),
}

#[derive(Debug, Clone)]
pub struct Train {
    pub dataset: PathBuf,
    pub model_out: PathBuf,
    pub iterations: usize,
    pub learning_rate: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Predict {
    pub model: PathBuf,
    pub mileage: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Evaluate {
    pub train: Train,
    pub plot_dir: PathBuf,
}

/* =================== Error type (no process::exit) =================== */

#[derive(thiserror::Error, Debug)]
pub enum CmdError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("regression error: {0}")]
    Fit(#[from] FitError),
    #[error("model file {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelFileError,
    },
    #[error("plot error: {0}")]
    Plot(#[from] PlotError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Config(String),
}

/* =================== Entry point =================== */

impl Config {
    pub fn run(&self) -> Result<(), CmdError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(&mut stdin.lock(), &mut stdout.lock())
    }

    /// Runs the action reading answers from `input` and printing results to `out`.
    pub fn run_with<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<(), CmdError> {
        match &self.action {
            Action::Train(t) => self.run_train(t, out).map(|_| ()),
            Action::Predict(p) => self.run_predict(p, input, out),
            Action::Evaluate(e) => self.run_evaluate(e, out),
        }
    }
}

/* =================== Actions =================== */

impl Config {
    fn run_train<W: Write>(&self, t: &Train, out: &mut W) -> Result<(Dataset, TrainedModel), CmdError> {
        let dataset = Dataset::from_path(&t.dataset)?;
        info!("loaded {} observations from {}", dataset.len(), t.dataset.display());

        let regression = LinearRegression::new(t.iterations, t.learning_rate)?;
        let model = train(&dataset, &regression, &initial_theta(t.seed))?;

        model
            .params
            .save(&t.model_out)
            .map_err(|source| CmdError::Model { path: t.model_out.clone(), source })?;
        writeln!(out, "Training completed. Model saved in '{}'.", t.model_out.display())?;
        Ok((dataset, model))
    }

    fn run_predict<R: BufRead, W: Write>(
        &self,
        p: &Predict,
        input: &mut R,
        out: &mut W,
    ) -> Result<(), CmdError> {
        let params = ModelParams::load_or_default(&p.model)
            .map_err(|source| CmdError::Model { path: p.model.clone(), source })?;
        debug!("predicting with {:?}", params);

        let mileage = match p.mileage {
            Some(km) => km,
            None => prompt_mileage(input, out)?,
        };
        let price = estimate_price(&params, mileage)?;
        writeln!(out, "The estimated price for a car with {mileage} km is ${price:.2}")?;
        Ok(())
    }

    fn run_evaluate<W: Write>(&self, e: &Evaluate, out: &mut W) -> Result<(), CmdError> {
        let (dataset, model) = self.run_train(&e.train, out)?;
        let evaluation = evaluate(&dataset, &model)?;

        let written = plot::draw_all(&e.plot_dir, &dataset, &model)?;
        for path in &written {
            writeln!(out, "Plot written to '{}'.", path.display())?;
        }

        let raw = model.line().denormalize(&model.bounds);
        writeln!(out, "Fitted line: price = {:.2} + {:.6} * km", raw.intercept, raw.slope)?;
        writeln!(
            out,
            "Least squares optimum: theta0 {:.2}, theta1 {:.2} (gradient descent: {:.2}, {:.2})",
            evaluation.least_squares.intercept,
            evaluation.least_squares.slope,
            model.params.theta0,
            model.params.theta1
        )?;
        writeln!(out, "Root mean squared error: {:.2}", evaluation.rmse)?;
        writeln!(out, "Model accuracy (R^2 score): {:.2} %.", evaluation.r_squared * 100.0)?;
        Ok(())
    }
}

fn prompt_mileage<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<f64, CmdError> {
    write!(out, "Enter the mileage (in km) of the car: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CmdError::Config("no mileage given".to_string()));
    }
    parse_mileage(&line).map_err(CmdError::Config)
}
