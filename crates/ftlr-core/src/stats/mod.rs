pub mod bounds;
pub mod linreg;
pub mod stats;

pub use bounds::{normalize_scalar, Bounds};
pub use linreg::LinReg;
pub use stats::{r_squared, rmse};
