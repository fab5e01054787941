//! Random Forest training with parallel tree construction.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::{ImportanceMode, OobMode, RandomForestConfig};
use crate::error::RfError;
use crate::importance::rank_importances;
use crate::oob::oob_score;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{self, DecisionTree, TreeParams};

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `draw_count` indices with replacement; also return the
/// indices never drawn.
fn bootstrap(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> (Vec<usize>, Vec<usize>) {
    let mut in_bag = vec![false; n_samples];
    let drawn: Vec<usize> = (0..draw_count)
        .map(|_| {
            let i = rng.gen_range(0..n_samples);
            in_bag[i] = true;
            i
        })
        .collect();
    let out_of_bag = (0..n_samples).filter(|&i| !in_bag[i]).collect();
    (drawn, out_of_bag)
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    config.validate()?;
    let columns = tree::to_columns(features, labels)?;
    let n_samples = features.len();
    let n_features = columns.len();
    if feature_names.len() != n_features {
        return Err(RfError::FeatureNameMismatch {
            n_features,
            n_names: feature_names.len(),
        });
    }
    let max_features = config.max_features.resolve(n_features)?;
    let n_classes = tree::n_classes(labels);
    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        draw_count,
        "training random forest"
    );

    let mut master = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.n_trees).map(|_| master.r#gen()).collect();

    let params = TreeParams {
        criterion: config.criterion,
        max_depth: config.max_depth,
        min_samples_split: config.min_samples_split,
        min_samples_leaf: config.min_samples_leaf,
    };
    let columns = &columns;

    let grown: Vec<(DecisionTree, Vec<usize>)> = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (in_bag, out_of_bag) = bootstrap(n_samples, draw_count, &mut rng);
            let tree = tree::grow(columns, labels, in_bag, n_classes, params, max_features, &mut rng);
            (tree, out_of_bag)
        })
        .collect();
    let (trees, out_of_bag): (Vec<DecisionTree>, Vec<Vec<usize>>) = grown.into_iter().unzip();

    debug!(
        mean_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>() as f64 / trees.len() as f64,
        "trees grown"
    );

    let importances = match config.importance_mode {
        ImportanceMode::Enabled => rank_importances(&trees, feature_names),
        ImportanceMode::Disabled => Vec::new(),
    };

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    let oob = match config.oob_mode {
        OobMode::Enabled => Some(oob_score(&forest, features, labels, &out_of_bag)?),
        OobMode::Disabled => None,
    };

    info!(
        oob_error = oob.as_ref().map(|s| s.error_rate),
        "random forest training complete"
    );

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_classes,
        n_samples,
        max_features,
        draw_count,
    };
    Ok(RandomForestResult::new(forest, importances, oob, metadata))
}
