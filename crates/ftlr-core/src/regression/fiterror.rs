/// Non-conformant matrix dimensions for an operation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows { row: usize, expected: usize, found: usize },
    #[error("storage of {len} values does not fit a {rows}x{cols} matrix")]
    StorageLength { rows: usize, cols: usize, len: usize },
    #[error("{op}: incompatible shapes {left:?} and {right:?}")]
    Mismatch { op: &'static str, left: (usize, usize), right: (usize, usize) },
    #[error("{op}: expected shape {expected:?}, got {found:?}")]
    Unexpected { op: &'static str, expected: (usize, usize), found: (usize, usize) },
    #[error("{0} is undefined on an empty matrix")]
    Empty(&'static str),
}

/// Degenerate divisions caught before they can turn into NaN or infinity.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DivisionError {
    #[error("degenerate normalization bounds: xmin {xmin} must be below xmax {xmax}")]
    DegenerateBounds { xmin: f64, xmax: f64 },
    #[error("target has no variance, coefficient of determination is undefined")]
    ZeroVariance,
    #[error("mean of an empty matrix")]
    EmptyMean,
    #[error("cannot average over zero observations")]
    NoObservations,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error(transparent)]
    Division(#[from] DivisionError),
    #[error("invalid learning rate {0}: must be finite and positive")]
    LearningRate(f64),
    #[error("non-finite value encountered: {0}")]
    NonFinite(&'static str),
}

pub type FitResult<T> = Result<T, FitError>;
