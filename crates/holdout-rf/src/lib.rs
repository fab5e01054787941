//! Random Forest classification: train, predict, out-of-bag error.
//!
//! CART decision trees grown on bootstrap samples with a random feature
//! subset per split, trained in parallel via rayon and combined by
//! majority vote. Defaults follow the classic Breiman/Cutler forest:
//! 500 trees, `floor(sqrt(p))` candidate features, fully grown trees.

mod config;
mod error;
mod forest;
mod importance;
mod node;
mod oob;
mod predict;
mod result;
mod split;
mod tree;

pub use config::{ImportanceMode, MaxFeatures, OobMode, RandomForestConfig};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use oob::OobScore;
pub use predict::ClassVotes;
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
