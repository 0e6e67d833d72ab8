//! Interestingness measures of a rule, per class.
//!
//! See L. Geng and H. J. Hamilton,
//! *Interestingness measures for data mining: A survey*, 2006.
//! Every measure is computed from the unweighted coverage of the itemset.
//! Zero denominators yield zero.
use std::collections::BTreeMap;

use crate::Label;
use crate::sample::{Itemset, TrainingSet};


/// Fraction of the covered instances that belong to each class.
pub fn confidence(itemset: &Itemset, classes: &[Label]) -> BTreeMap<Label, f64> {
    let coverage = classes.iter()
        .map(|&y| itemset.coverage(y))
        .sum::<usize>() as f64;

    classes.iter()
        .map(|&y| {
            let conf = if coverage > 0f64 {
                itemset.coverage(y) as f64 / coverage
            } else {
                0f64
            };
            (y, conf)
        })
        .collect()
}


/// Fraction of the `n_sample` instances covered with each class.
pub fn support(itemset: &Itemset, classes: &[Label], n_sample: usize)
    -> BTreeMap<Label, f64>
{
    classes.iter()
        .map(|&y| {
            let supp = if n_sample > 0 {
                itemset.coverage(y) as f64 / n_sample as f64
            } else {
                0f64
            };
            (y, supp)
        })
        .collect()
}


/// Confidence divided by the prior of the class.
pub fn lift(itemset: &Itemset, priors: &BTreeMap<Label, f64>)
    -> BTreeMap<Label, f64>
{
    let classes = priors.keys().copied().collect::<Vec<_>>();
    confidence(itemset, &classes)
        .into_iter()
        .map(|(y, conf)| {
            let prior = priors[&y];
            (y, if prior > 0f64 { conf / prior } else { 0f64 })
        })
        .collect()
}


/// `(1 - prior) / (1 - confidence)`.
/// Rules that never err get `0`.
pub fn conviction(itemset: &Itemset, priors: &BTreeMap<Label, f64>)
    -> BTreeMap<Label, f64>
{
    let classes = priors.keys().copied().collect::<Vec<_>>();
    confidence(itemset, &classes)
        .into_iter()
        .map(|(y, conf)| {
            let value = if conf >= 1f64 {
                0f64
            } else {
                (1f64 - priors[&y]) / (1f64 - conf)
            };
            (y, value)
        })
        .collect()
}


/// Fraction of the training instances in each class.
pub fn priors(train: &TrainingSet) -> BTreeMap<Label, f64> {
    let n_sample = train.len() as f64;
    train.class_sizes()
        .into_iter()
        .map(|(y, n)| (y, if n_sample > 0f64 { n as f64 / n_sample } else { 0f64 }))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{Pattern, support_from};

    fn itemset() -> Itemset {
        let support = support_from([(1, vec![0, 1, 2]), (2, vec![3])]);
        Itemset::new(0, Pattern::from([4]), support)
    }

    #[test]
    fn confidence_is_a_coverage_fraction() {
        let conf = confidence(&itemset(), &[1, 2, 3]);
        assert_eq!(conf[&1], 0.75);
        assert_eq!(conf[&2], 0.25);
        assert_eq!(conf[&3], 0.0);

        let empty = Itemset::synthetic_default();
        assert!(confidence(&empty, &[1, 2]).values().all(|c| *c == 0.0));
    }

    #[test]
    fn lift_and_conviction() {
        let train = TrainingSet::from_labels([1, 1, 1, 2, 2, 2, 2, 2]);
        let priors = priors(&train);
        assert_eq!(priors[&1], 0.375);

        let lift = lift(&itemset(), &priors);
        assert!((lift[&1] - 2.0).abs() < 1e-12);

        let conv = conviction(&itemset(), &priors);
        assert!((conv[&1] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn support_over_the_training_set() {
        let supp = support(&itemset(), &[1, 2], 8);
        assert_eq!(supp[&1], 0.375);
        assert_eq!(supp[&2], 0.125);
    }
}
