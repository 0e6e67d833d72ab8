use rand::prelude::*;
use colored::Colorize;

use std::collections::BTreeMap;

use crate::{Label, TrainingSet};
use crate::common::checker;
use crate::constants::{
    DEFAULT_N_FOLDS,
    DEFAULT_SEED,
    PRINT_WIDTH,
    SPLIT_TOLERANCE,
};


/// A weighted, stratified k-fold splitter.
///
/// The instance ids are shuffled once (seeded).
/// Each class then fills the folds `0, 1, ..., K-1` in order:
/// fold `i` takes, in shuffled order, every remaining instance
/// that still fits under the quota `(i + 1) / K` of the class weight,
/// and stops as soon as the quota is met.
/// The last fold takes whatever is left,
/// so the folds always partition the training set.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::research::StratifiedWeightedFolds;
///
/// let train = TrainingSet::from_labels([1, 1, 1, 2, 2, 2]);
/// let folds = StratifiedWeightedFolds::new(&train)
///     .n_folds(3)
///     .seed(777)
///     .folds();
/// assert_eq!(folds.len(), 3);
/// ```
pub struct StratifiedWeightedFolds<'a> {
    sample: &'a TrainingSet,
    n_folds: usize,
    seed: u64,
    weights: Option<Vec<f64>>,
    verbose: bool,
}


impl<'a> StratifiedWeightedFolds<'a> {
    /// Construct a new splitter over `sample`.
    /// Every instance weighs `1` by default.
    #[inline]
    pub fn new(sample: &'a TrainingSet) -> Self {
        Self {
            sample,
            n_folds: DEFAULT_N_FOLDS,
            seed: DEFAULT_SEED,
            weights: None,
            verbose: false,
        }
    }


    /// Set the number of folds.
    /// Default value is `5.`
    #[inline]
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the randomness for shuffling.
    /// Default value is `1234.`
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the weight of each instance.
    #[inline]
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }


    /// If `true`, prints the size and the weight of every fold.
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Returns the folds as lists of instance ids.
    pub fn folds(&self) -> Vec<Vec<usize>> {
        checker::n_folds(self.n_folds);

        let n_sample = self.sample.len();
        let weights = match &self.weights {
            Some(w) => {
                checker::weights(w, n_sample);
                w.clone()
            },
            None => vec![1f64; n_sample],
        };

        let mut keys = (0..n_sample).collect::<Vec<_>>();
        let mut rng = StdRng::seed_from_u64(self.seed);
        keys.shuffle(&mut rng);

        let k = self.n_folds as f64;
        let mut quota: BTreeMap<Label, f64> = BTreeMap::new();
        let mut members: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
        for y in self.sample.classes() {
            quota.insert(y, 0f64);
            members.insert(y, Vec::new());
        }
        for i in keys {
            let y = self.sample.label(i);
            *quota.entry(y).or_default() += weights[i] / k;
            members.entry(y).or_default().push(i);
        }

        let mut filled: BTreeMap<Label, f64> = quota.keys()
            .map(|&y| (y, 0f64))
            .collect();

        let mut folds = Vec::with_capacity(self.n_folds);
        for i in 0..self.n_folds {
            let last = i + 1 == self.n_folds;
            let mut fold = Vec::new();

            for (y, pool) in members.iter_mut() {
                if last {
                    fold.append(pool);
                    continue;
                }

                let expected = (i + 1) as f64 * quota[y];
                let current = filled.entry(*y).or_default();
                let mut rest = Vec::with_capacity(pool.len());
                let mut full = false;
                for &j in pool.iter() {
                    if !full && *current + weights[j] - SPLIT_TOLERANCE <= expected {
                        *current += weights[j];
                        fold.push(j);
                    } else {
                        rest.push(j);
                    }
                    full = full || *current + SPLIT_TOLERANCE >= expected;
                }
                *pool = rest;
            }

            if self.verbose {
                let mass = fold.iter().map(|&j| weights[j]).sum::<f64>();
                println!(
                    "{}    {}    {}",
                    format!("  [{: >3}'th fold]", i + 1).bold().red(),
                    format!("[SIZE {:>PRINT_WIDTH$}]", fold.len()).bold().green(),
                    format!("[WEIGHT {:>PRINT_WIDTH$.3}]", mass).bold().yellow(),
                );
            }
            folds.push(fold);
        }

        folds
    }
}
