//! This file defines some functions that checks some pre-conditions
//! E.g., Shape of weight vectors

use crate::Label;
use crate::sample::Support;


/// An instance may belong to the support of at most one class.
#[inline(always)]
pub(crate) fn disjoint_support(support: &Support) {
    let sets = support.iter().collect::<Vec<_>>();
    for (k, (y, a)) in sets.iter().enumerate() {
        for (z, b) in &sets[k+1..] {
            assert!(
                a.is_disjoint(b),
                "classes {y} and {z} share covered instances"
            );
        }
    }
}


/// Discrete boosting handles two-class problems only.
#[inline(always)]
pub(crate) fn binary_classes(classes: &[Label]) {
    assert!(
        classes.len() == 2,
        "discrete boosting needs exactly two classes. got {classes:?}."
    );
}


/// Check the number of folds.
#[inline(always)]
pub(crate) fn n_folds(k: usize) {
    assert!(k > 0, "the number of folds must be positive.");
}


/// A weight vector must be indexed by the training instances
/// and hold non-negative finite values.
#[inline(always)]
pub(crate) fn weights(weights: &[f64], n_sample: usize) {
    assert_eq!(
        weights.len(), n_sample,
        "expected {n_sample} weights, got {}", weights.len()
    );
    assert!(
        weights.iter().all(|w| w.is_finite() && *w >= 0f64),
        "weights must be non-negative and finite"
    );
}
