use crate::matrix::Matrix;
use crate::regression::fiterror::DivisionError;
use crate::stats::{Bounds, LinReg};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_MODEL_PATH: &str = "./models/trained_model.json";

const FIELDS: [&str; 4] = ["theta0", "theta1", "xmin", "xmax"];

#[derive(thiserror::Error, Debug)]
pub enum ModelFileError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("model must be a JSON object with theta0, theta1, xmin and xmax")]
    NotAnObject,
    #[error("missing or non-numeric field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' is not finite: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

impl ModelFileError {
    /// Whether a reader may substitute [`ModelParams::default`] for this error.
    /// Broken JSON syntax is the one failure that is never papered over.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ModelFileError::Format(_))
    }
}

/// Trained model as stored on disk: theta plus the normalization bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelParams {
    /// intercept
    pub theta0: f64,
    /// slope on normalized mileage
    pub theta1: f64,
    pub xmin: f64,
    pub xmax: f64,
}

impl Default for ModelParams {
    /// Untrained model: predicts 0 for every input.
    fn default() -> Self {
        Self { theta0: 0.0, theta1: 0.0, xmin: 0.0, xmax: 1.0 }
    }
}

impl ModelParams {
    pub fn from_fit(line: LinReg, bounds: Bounds) -> Self {
        Self { theta0: line.intercept, theta1: line.slope, xmin: bounds.xmin, xmax: bounds.xmax }
    }

    pub fn line(&self) -> LinReg {
        LinReg::from_val(self.theta0, self.theta1)
    }

    pub fn theta(&self) -> Matrix {
        self.line().to_theta()
    }

    pub fn bounds(&self) -> Result<Bounds, DivisionError> {
        Bounds::new(self.xmin, self.xmax)
    }

    fn values(&self) -> [f64; 4] {
        [self.theta0, self.theta1, self.xmin, self.xmax]
    }

    fn check_finite(&self) -> Result<(), ModelFileError> {
        for (field, value) in FIELDS.into_iter().zip(self.values()) {
            if !value.is_finite() {
                return Err(ModelFileError::NonFinite { field, value });
            }
        }
        Ok(())
    }

    /// Strict parse of a model document. Keys other than the four model
    /// fields are ignored. Numbers keep their source text so that a value
    /// overflowing f64 surfaces as [`ModelFileError::NonFinite`].
    pub fn parse(contents: &str) -> Result<Self, ModelFileError> {
        let document: Value = serde_json::from_str(contents)?;
        let object = document.as_object().ok_or(ModelFileError::NotAnObject)?;

        let field = |object: &Map<String, Value>, name: &'static str| {
            object
                .get(name)
                .and_then(Value::as_number)
                .and_then(|n| n.to_string().parse::<f64>().ok())
                .ok_or(ModelFileError::MissingField(name))
        };
        let params = Self {
            theta0: field(object, "theta0")?,
            theta1: field(object, "theta1")?,
            xmin: field(object, "xmin")?,
            xmax: field(object, "xmax")?,
        };
        for key in object.keys().filter(|k| !FIELDS.contains(&k.as_str())) {
            debug!("ignoring unknown model field '{key}'");
        }
        params.check_finite()?;
        Ok(params)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelFileError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|source| ModelFileError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&contents)
    }

    /// Loads a model, falling back to [`ModelParams::default`] when the file
    /// is missing, unreadable or incomplete. Corrupt JSON is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ModelFileError> {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(params) => {
                debug!("loaded model from {}", path.display());
                Ok(params)
            },
            Err(e) if e.is_recoverable() => {
                warn!("{}: {e}, initializing theta to 0", path.display());
                Ok(Self::default())
            },
            Err(e) => Err(e),
        }
    }

    /// Overwrites `path`, creating missing parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelFileError> {
        let path = path.as_ref();
        self.check_finite()?;

        let io_err = |source| ModelFileError::Io { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        fs::write(path, buf).map_err(io_err)?;

        debug!("wrote model to {}", path.display());
        Ok(())
    }
}
