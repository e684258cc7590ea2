pub mod cmd;
pub mod dataset;
pub mod matrix;
pub mod model_file;
pub mod plot;
pub mod prediction;
pub mod regression;
pub mod stats;
pub mod training;
