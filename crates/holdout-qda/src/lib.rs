//! Quadratic discriminant analysis.
//!
//! Each class gets its own mean vector and unbiased covariance matrix;
//! a sample is assigned to the class maximizing
//! `log π_k − ½ log|Σ_k| − ½ (x − μ_k)ᵀ Σ_k⁻¹ (x − μ_k)`.

mod config;
mod error;
mod linalg;
mod model;

pub use config::QdaConfig;
pub use error::QdaError;
pub use model::{ClassDensity, QdaModel};
