use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::cmd::config::{Action, Config, Evaluate, Predict, Train};
use crate::dataset::DEFAULT_DATASET_PATH;
use crate::model_file::DEFAULT_MODEL_PATH;
use crate::regression::LinearRegression;

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn readable_file(s: &str, ext: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !has_extension(&path, "csv") && !has_extension(&path, "json") {
        return Err(format!("Invalid file type '{s}'. Only .csv and .json files are allowed."));
    }
    if !has_extension(&path, ext) {
        return Err(format!("Invalid file type '{s}'. Expected a .{ext} file here."));
    }
    if !path.is_file() {
        return Err(format!("File '{s}' does not exist."));
    }
    File::open(&path).map_err(|e| format!("File '{s}' is not readable: {e}"))?;
    Ok(path)
}

fn existing_csv(s: &str) -> Result<PathBuf, String> {
    readable_file(s, "csv")
}

fn existing_json(s: &str) -> Result<PathBuf, String> {
    readable_file(s, "json")
}

fn json_output(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if !has_extension(&path, "json") {
        return Err(format!("Invalid file type '{s}'. The model is written as .json."));
    }
    Ok(path)
}

/// Finite, non-negative number of kilometers.
pub fn parse_mileage(s: &str) -> Result<f64, String> {
    let value: f64 =
        s.trim().parse().map_err(|_| format!("'{}' is not a valid mileage", s.trim()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("mileage must be a finite, non-negative number, got {value}"));
    }
    Ok(value)
}

fn parse_learning_rate(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("learning rate must be positive, got {value}"));
    }
    Ok(value)
}

#[derive(Debug, Parser)]
#[command(
    name = "ftlr",
    about = "Car price estimation from mileage with a gradient-descent linear fit",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the model on a dataset and save its parameters
    Train(TrainArgs),

    /// Estimate the price of a car from its mileage
    Predict(PredictArgs),

    /// Train, then report accuracy and draw plots
    #[command(alias = "bonus")]
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Dataset csv with km,price columns
    #[arg(
        value_name = "DATASET",
        env = "FTLR_DATASET",
        value_hint = ValueHint::FilePath,
        value_parser = existing_csv
    )]
    pub dataset: Option<PathBuf>,

    /// Where to write the trained model
    #[arg(
        short = 'm',
        long = "model",
        env = "FTLR_MODEL",
        default_value = DEFAULT_MODEL_PATH,
        value_parser = json_output
    )]
    pub model: PathBuf,

    /// Number of gradient-descent iterations
    #[arg(short = 'i', long = "iterations", default_value_t = LinearRegression::DEFAULT_ITERATIONS)]
    pub iterations: usize,

    /// Gradient-descent step size
    #[arg(
        short = 'l',
        long = "learning-rate",
        default_value_t = LinearRegression::DEFAULT_LEARNING_RATE,
        value_parser = parse_learning_rate
    )]
    pub learning_rate: f64,

    /// Seed for a random starting theta (zeros when omitted)
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Trained model json
    #[arg(
        value_name = "MODEL",
        value_hint = ValueHint::FilePath,
        value_parser = existing_json
    )]
    pub model: Option<PathBuf>,

    /// Mileage in km; prompted for on stdin when omitted
    #[arg(short = 'k', long = "mileage", value_parser = parse_mileage)]
    pub mileage: Option<f64>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Directory receiving the svg plots
    #[arg(short = 'p', long = "plots", value_name = "DIR", default_value = "./plots")]
    pub plots: PathBuf,
}

impl TrainArgs {
    fn into_train(self) -> Train {
        Train {
            dataset: self.dataset.unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
            model_out: self.model,
            iterations: self.iterations,
            learning_rate: self.learning_rate,
            seed: self.seed,
        }
    }
}

// -------- Map CLI -> Config/Action types --------

impl Cli {
    pub fn into_config(self) -> Config {
        let action = match self.command {
            Commands::Train(args) => Action::Train(args.into_train()),
            Commands::Predict(args) => Action::Predict(Predict {
                model: args.model.unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
                mileage: args.mileage,
            }),
            Commands::Evaluate(args) => {
                Action::Evaluate(Evaluate { train: args.train.into_train(), plot_dir: args.plots })
            },
        };
        Config { action }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    fn scratch(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ftlr-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn train_defaults() {
        let cli = Cli::try_parse_from(["ftlr", "train"]).unwrap();
        let Action::Train(train) = cli.into_config().action else {
            panic!("expected train action");
        };
        assert_eq!(train.dataset, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(train.model_out, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(train.iterations, 1_000);
        assert_eq!(train.learning_rate, 0.07);
        assert_eq!(train.seed, None);
    }

    #[test]
    fn bonus_is_evaluate() {
        let csv = scratch("bonus.csv", "km,price\n1,2\n");
        let cli =
            Cli::try_parse_from(["ftlr", "bonus", csv.to_str().unwrap(), "--plots", "out"]).unwrap();
        let Action::Evaluate(evaluate) = cli.into_config().action else {
            panic!("expected evaluate action");
        };
        assert_eq!(evaluate.train.dataset, csv);
        assert_eq!(evaluate.plot_dir, PathBuf::from("out"));
    }

    #[test]
    fn predict_with_mileage() {
        let cli = Cli::try_parse_from(["ftlr", "predict", "--mileage", "42000"]).unwrap();
        let Action::Predict(predict) = cli.into_config().action else {
            panic!("expected predict action");
        };
        assert_eq!(predict.model, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(predict.mileage, Some(42000.0));
    }

    #[test]
    fn rejects_unknown_mode_and_extra_arguments() {
        assert!(Cli::try_parse_from(["ftlr"]).is_err());
        assert!(Cli::try_parse_from(["ftlr", "--training"]).is_err());
        assert!(Cli::try_parse_from(["ftlr", "fly"]).is_err());
        let csv = scratch("extra.csv", "km,price\n1,2\n");
        let csv = csv.to_str().unwrap();
        assert!(Cli::try_parse_from(["ftlr", "train", csv, csv]).is_err());
    }

    #[test]
    fn path_override_is_validated() {
        let txt = scratch("data.txt", "km,price\n");
        assert!(Cli::try_parse_from(["ftlr", "train", txt.to_str().unwrap()]).is_err());

        let json = scratch("model.json", "{}");
        assert!(Cli::try_parse_from(["ftlr", "train", json.to_str().unwrap()]).is_err());
        assert!(Cli::try_parse_from(["ftlr", "predict", json.to_str().unwrap()]).is_ok());

        assert!(Cli::try_parse_from(["ftlr", "train", "/no/such/data.csv"]).is_err());
        assert!(Cli::try_parse_from(["ftlr", "train", "--model", "model.txt"]).is_err());
    }

    #[test]
    fn mileage_must_be_sensible() {
        assert_eq!(parse_mileage(" 1500 "), Ok(1500.0));
        assert!(parse_mileage("abc").is_err());
        assert!(parse_mileage("-1").is_err());
        assert!(parse_mileage("inf").is_err());
        assert!(Cli::try_parse_from(["ftlr", "predict", "--mileage", "-5"]).is_err());
        assert!(Cli::try_parse_from(["ftlr", "train", "--learning-rate", "0"]).is_err());
    }
}
