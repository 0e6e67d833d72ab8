use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use tracing::info;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::{
    RuleEnsemble,
    RuleHypothesis,
    Target,
    TrainingSet,

    common::{checker, utils},
    constants::{DEFAULT_MAX_ROUNDS, DEFAULT_N_FOLDS, DEFAULT_SEED},
};
use super::StratifiedWeightedFolds;


/// Weighted accuracy of every round prefix, summed over the folds.
/// `accuracy[t]` scores the models truncated after `t + 1` rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvCurve {
    /// Weighted accuracy of each round prefix.
    pub accuracy: Vec<f64>,
}


impl CvCurve {
    /// Construct a curve from per-round accuracies.
    pub fn new(accuracy: Vec<f64>) -> Self {
        Self { accuracy }
    }


    /// Number of rounds in the curve.
    #[inline]
    pub fn len(&self) -> usize {
        self.accuracy.len()
    }


    /// Returns `true` if the curve has no round.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.accuracy.is_empty()
    }


    /// For every ceiling `i`, the number of rounds `t <= i + 1`
    /// with the best accuracy.
    /// Equal accuracies go to the shorter model.
    pub fn best_rounds(&self) -> Vec<usize> {
        let mut best = 0;
        self.accuracy.iter()
            .enumerate()
            .map(|(i, &acc)| {
                if acc > self.accuracy[best] { best = i; }
                best + 1
            })
            .collect()
    }


    /// Write `self` as JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> serde_json::Result<()> {
        let file = File::create(path).map_err(serde_json::Error::io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
    }
}


/// Internal cross validation of a training algorithm.
///
/// The training set is split by [`StratifiedWeightedFolds`].
/// For each fold, the instances of the fold get weight zero,
/// the algorithm is trained on the remaining weights and
/// every round prefix of its model predicts the fold.
/// A correct prediction adds the weight of the instance;
/// an abstention counts as correct when the instance belongs to
/// the heaviest class outside the fold.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::research::InternalCv;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
///
/// let curve = InternalCv::new(&train)
///     .n_folds(5)
///     .max_rounds(50)
///     .run(|weights| {
///         Slipper::init(&train, &itemsets)
///             .initial_weights(weights)
///             .max_rounds(50)
///             .run()
///     });
/// let rounds = curve.best_rounds();
/// ```
pub struct InternalCv<'a> {
    sample: &'a TrainingSet,
    n_folds: usize,
    seed: u64,
    max_rounds: usize,
    weights: Option<Vec<f64>>,
}


impl<'a> InternalCv<'a> {
    /// Construct a new cross validation over `sample`.
    pub fn new(sample: &'a TrainingSet) -> Self {
        Self {
            sample,
            n_folds: DEFAULT_N_FOLDS,
            seed: DEFAULT_SEED,
            max_rounds: DEFAULT_MAX_ROUNDS,
            weights: None,
        }
    }


    /// Set the number of folds.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }


    /// Set the seed of the fold splitter.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the length of the accuracy curve.
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }


    /// Set the weight of each instance. Defaults to `1` each.
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }


    /// Run the cross validation.
    /// `train` receives the reduced weights of a fold
    /// and returns the trained model.
    pub fn run<H, F>(&self, mut train: F) -> CvCurve
        where H: RuleHypothesis + Sync,
              F: FnMut(Vec<f64>) -> RuleEnsemble<H>,
    {
        checker::n_folds(self.n_folds);

        let n_sample = self.sample.len();
        let mut accuracy = vec![0f64; self.max_rounds];
        if n_sample < self.n_folds {
            info!(n_sample, n_folds = self.n_folds, "too few instances for internal cross validation");
            return CvCurve::new(accuracy);
        }

        let weights = match &self.weights {
            Some(w) => {
                checker::weights(w, n_sample);
                w.clone()
            },
            None => vec![1f64; n_sample],
        };

        let folds = StratifiedWeightedFolds::new(self.sample)
            .n_folds(self.n_folds)
            .seed(self.seed)
            .weights(weights.clone())
            .folds();

        for (k, fold) in folds.iter().enumerate() {
            let mut reduced = weights.clone();
            fold.iter().for_each(|&i| { reduced[i] = 0f64; });

            let sums = self.sample.class_weight_sums(&reduced);
            let default_class = utils::argmax(&sums);

            let model = train(reduced);
            info!(fold = k + 1, rules = model.len(), "internal cross validation trained a fold");

            // A short model repeats its last prediction. Its last rule is
            // not duplicated, so it adds no further score.
            let predictions = fold.par_iter()
                .map(|&i| model.predict_rounds(Target::Id(i), false, self.max_rounds))
                .collect::<Vec<_>>();

            for (&i, rounds) in fold.iter().zip(predictions) {
                let label = self.sample.label(i);
                rounds.into_iter()
                    .take(self.max_rounds)
                    .enumerate()
                    .for_each(|(t, p)| {
                        let p = p.or(default_class);
                        if p == Some(label) {
                            accuracy[t] += weights[i];
                        }
                    });
            }
        }

        CvCurve::new(accuracy)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_rounds_prefer_shorter_models() {
        let curve = CvCurve::new(vec![1.0, 3.0, 2.0, 3.0, 4.0]);
        assert_eq!(curve.best_rounds(), vec![1, 2, 2, 2, 5]);
    }

    #[test]
    fn empty_curve_has_no_rounds() {
        let curve = CvCurve::new(Vec::new());
        assert!(curve.best_rounds().is_empty());
    }
}
