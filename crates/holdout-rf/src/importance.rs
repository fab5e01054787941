//! Mean decrease in impurity, aggregated over the forest.

use crate::tree::DecisionTree;

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub name: String,
    /// Share of the forest's total impurity decrease (sums to 1.0).
    pub importance: f64,
    /// 1 is most important.
    pub rank: usize,
}

/// Sum each feature's impurity decrease over all trees, normalize, and
/// rank descending. Equal importances keep feature order.
pub(crate) fn rank_importances(trees: &[DecisionTree], names: &[String]) -> Vec<RankedFeature> {
    let mut totals = vec![0.0f64; names.len()];
    for tree in trees {
        for (total, &v) in totals.iter_mut().zip(tree.raw_importances()) {
            *total += v;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecisionTreeConfig;

    #[test]
    fn single_leaf_trees_give_zero_importance() {
        let tree = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[0, 0])
            .unwrap();
        let ranked = rank_importances(&[tree], &["a".into(), "b".into()]);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|f| f.importance == 0.0));
        assert_eq!(ranked[0].name, "a");
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn ranks_are_descending() {
        let features: Vec<Vec<f64>> = (0..30).map(|i| vec![(i % 5) as f64, f64::from(i)]).collect();
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i >= 15)).collect();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let ranked = rank_importances(&[tree], &["weak".into(), "strong".into()]);
        assert_eq!(ranked[0].name, "strong");
        assert!(ranked[0].importance >= ranked[1].importance);
    }
}
