//! Exploratory data analysis: missing values, near-zero variance,
//! correlation filtering, and target binarization.

mod correlation;
mod error;
mod missing;
mod report;
mod target;
mod variance;

pub use correlation::{CorrelationMatrix, find_correlation};
pub use error::EdaError;
pub use missing::{MissingCount, missing_summary};
pub use report::{DropReason, EdaReport};
pub use target::{Binarized, Threshold, binarize, median};
pub use variance::{NzvConfig, VarianceDiagnostic, near_zero_variance};
