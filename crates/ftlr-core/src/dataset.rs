use crate::matrix::Matrix;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_DATASET_PATH: &str = "./data/data.csv";

/// Column layout of the dataset csv: mileage first, price second.
pub const FEATURE_COLUMN: usize = 0;
pub const TARGET_COLUMN: usize = 1;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("could not open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: expected km and price columns, found {found} column(s)")]
    MissingColumn { line: u64, found: usize },
    #[error("line {line}: {column} value '{value}' is not a number")]
    NotANumber { line: u64, column: &'static str, value: String },
    #[error("line {line}: {column} value {value} is not finite")]
    NonFinite { line: u64, column: &'static str, value: f64 },
    #[error("{features} feature values for {targets} targets")]
    LengthMismatch { features: usize, targets: usize },
    #[error("dataset contains no observations")]
    Empty,
}

pub fn mk_rdr<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn parse_cell(
    record: &csv::StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<f64, DatasetError> {
    let raw = record.get(index).ok_or(DatasetError::MissingColumn { line, found: record.len() })?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| DatasetError::NotANumber { line, column, value: raw.to_string() })?;
    if !value.is_finite() {
        return Err(DatasetError::NonFinite { line, column, value });
    }
    Ok(value)
}

/// Observations as two column matrices of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Matrix,
    targets: Matrix,
}

impl Dataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|source| DatasetError::Io { path: path.to_path_buf(), source })?;
        let dataset = Self::from_reader(file)?;
        debug!("read {} observations from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut rdr = mk_rdr(reader);
        let mut features = Vec::new();
        let mut targets = Vec::new();

        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            features.push(parse_cell(&record, FEATURE_COLUMN, "km", line)?);
            targets.push(parse_cell(&record, TARGET_COLUMN, "price", line)?);
        }

        Self::from_columns(features, targets)
    }

    pub fn from_columns(features: Vec<f64>, targets: Vec<f64>) -> Result<Self, DatasetError> {
        if features.len() != targets.len() {
            return Err(DatasetError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if features.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { features: Matrix::column(features), targets: Matrix::column(targets) })
    }

    /// Mileage, one row per observation.
    pub fn features(&self) -> &Matrix {
        &self.features
    }

    /// Price, one row per observation.
    pub fn targets(&self) -> &Matrix {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.features.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_km_then_price() {
        let csv = "\
km,price
240000,3650
139800,3800
";
        let data = Dataset::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.features().values(), &[240000.0, 139800.0]);
        assert_eq!(data.targets().values(), &[3650.0, 3800.0]);
        assert_eq!(data.features().shape(), (2, 1));
    }

    #[test]
    fn tolerates_whitespace_and_extra_columns() {
        let csv = "km, price, note\n 1000 , 9000 , clean\n2000,8000,\n";
        let data = Dataset::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(data.targets().values(), &[9000.0, 8000.0]);
    }

    #[test]
    fn header_only_is_empty() {
        let err = Dataset::from_reader(Cursor::new("km,price\n")).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn fails_on_text_value() {
        let csv = "km,price\n1000,9000\nlots,8000\n";
        match Dataset::from_reader(Cursor::new(csv)).unwrap_err() {
            DatasetError::NotANumber { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "km");
                assert_eq!(value, "lots");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fails_on_missing_price() {
        let csv = "km,price\n1000\n";
        assert!(matches!(
            Dataset::from_reader(Cursor::new(csv)).unwrap_err(),
            DatasetError::MissingColumn { found: 1, .. }
        ));
    }

    #[test]
    fn fails_on_nan() {
        let csv = "km,price\n1000,NaN\n";
        assert!(matches!(
            Dataset::from_reader(Cursor::new(csv)).unwrap_err(),
            DatasetError::NonFinite { column: "price", .. }
        ));
    }

    #[test]
    fn missing_file() {
        let err = Dataset::from_path("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn columns_must_match() {
        assert!(matches!(
            Dataset::from_columns(vec![1.0, 2.0], vec![1.0]),
            Err(DatasetError::LengthMismatch { features: 2, targets: 1 })
        ));
    }
}
