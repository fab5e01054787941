//! File I/O, typed tabular data, and JSON artifacts for the holdout pipeline.

mod artifact;
mod domain;
mod error;
mod reader;
mod writer;

pub use artifact::{
    CompareArtifact, DroppedFeature, ExploreArtifact, MissingEntry, PairedEntry, SummaryEntry,
    VarianceEntry,
};
pub use domain::{BinaryLabel, Column, Dataset, DesignMatrix, ExperimentName};
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::ResultWriter;
