//! Monte Carlo hold-out evaluation.
//!
//! Repeatedly splits a labeled set into training and test parts, fits two
//! classifiers on the same training part, and records each one's test
//! misclassification rate. The paired error series are summarized by mean,
//! standard deviation and a normal-approximation confidence interval.

mod baseline;
mod classifier;
mod data;
mod error;
mod evaluator;
mod models;
mod split;
mod summary;

pub use baseline::MajorityClassifier;
pub use classifier::Classifier;
pub use data::LabeledSet;
pub use error::{ClassifierError, EvalError};
pub use evaluator::{FailurePolicy, ResamplingConfig, ResamplingResult, ResamplingSummary, TrialResult};
pub use models::{QdaClassifier, RandomForestClassifier};
pub use split::{Split, test_size};
pub use summary::{PairedSummary, Summary, error_rate, inverse_normal_cdf};
