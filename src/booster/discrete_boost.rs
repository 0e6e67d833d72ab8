//! Provides discrete [`DiscreteBoost`] over association rules,
//! after Schapire, *The strength of weak learnability*, 1990.
use rand::prelude::*;
use rayon::prelude::*;
use tracing::debug;

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::{
    Booster,
    Label,
    RuleClassifier,
    RuleEnsemble,
    RuleHypothesis,
    Target,
    Itemset,
    TrainingSet,

    common::{checker, utils, utils::Ties},
    constants::{DEFAULT_GAMMA, DEFAULT_MAX_ROUNDS, DEFAULT_SEED},
    research::CurrentHypothesis,
};


// Larger than any weighted error.
const ERROR_BASELINE: f64 = 1.0001;


/// Discrete AdaBoost for two-class problems.
///
/// Each round scans every itemset under both class assignments.
/// Labeling the support of a rule as class `a` errs on
/// the instances of `a` outside the support
/// and on the instances of the other class `b` inside it:
/// ```txt
/// error(a) = wsum[a] - wsupp[a] + wsupp[b].
/// ```
/// The rule with the smallest error is picked
/// (ties broken uniformly at random)
/// and weighted by `alpha = ln((1 - error) / error) / 2`.
/// Boosting stops when the smallest error is zero or
/// at least `0.5 - γ`.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
///
/// let mut booster = DiscreteBoost::init(&train, &itemsets)
///     .gamma(0.01)
///     .max_rounds(50)
///     .seed(7);
/// let f = booster.run();
///
/// let test = reader::read_test("data/test").unwrap();
/// let predictions = f.predict_all(&test, false);
/// ```
pub struct DiscreteBoost<'a> {
    // Training sample
    sample: &'a TrainingSet,

    // Candidate rules
    itemsets: &'a [Arc<Itemset>],

    // The two classes, ascending.
    classes: Vec<Label>,

    // Distribution on sample.
    dist: Vec<f64>,

    // Sum of `dist` per class.
    class_dist: BTreeMap<Label, f64>,

    // Optional starting weights.
    initial: Option<Vec<f64>>,

    // Margin parameter
    gamma: f64,

    seed: u64,
    rng: StdRng,

    max_rounds: usize,

    model: RuleEnsemble<RuleClassifier>,

    // Terminated iteration.
    terminated: usize,
}


impl<'a> DiscreteBoost<'a> {
    /// Initialize the `DiscreteBoost`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self {
            sample,
            itemsets,
            classes: Vec::new(),
            dist: Vec::new(),
            class_dist: BTreeMap::new(),
            initial: None,
            gamma: DEFAULT_GAMMA,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            max_rounds: DEFAULT_MAX_ROUNDS,
            model: RuleEnsemble::new(),
            terminated: usize::MAX,
        }
    }


    /// Set the margin `γ`.
    /// A rule is accepted only if its error is below `0.5 - γ`.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }


    /// Set the seed of the tie-breaking randomness.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the maximum number of rounds.
    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }


    /// Start from the given weights instead of the uniform distribution.
    /// The weights are normalized before boosting.
    pub fn initial_weights(mut self, weights: Vec<f64>) -> Self {
        self.initial = Some(weights);
        self
    }


    /// Returns the iteration at which boosting stopped.
    pub fn terminated(&self) -> usize {
        self.terminated
    }


    /// Current distribution on the training instances.
    pub fn distribution(&self) -> &[f64] {
        &self.dist
    }


    /// Current sum of the distribution per class.
    pub fn class_distribution(&self) -> &BTreeMap<Label, f64> {
        &self.class_dist
    }


    fn is_trivial(&self) -> bool {
        self.sample.is_empty() || self.itemsets.is_empty()
    }


    /// Re-weight the sample by the new rule and returns its weight.
    fn update_params(&mut self, h: &RuleClassifier, error: f64) -> f64 {
        let alpha = ((1f64 - error) / error).ln() / 2f64;

        let (right, wrong) = ((-alpha).exp(), alpha.exp());
        let labels = self.sample.labels();
        let class = h.predicted_class();
        self.dist.par_iter_mut()
            .enumerate()
            .for_each(|(i, d)| {
                // Same class inside, or another class outside.
                let inside = h.covers(Target::Id(i));
                let same = class == Some(labels[i]);
                *d *= if inside == same { right } else { wrong };
            });

        utils::normalize(&mut self.dist);
        self.class_dist = self.sample.class_weight_sums(&self.dist);

        alpha
    }
}


impl Booster for DiscreteBoost<'_> {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "Discrete Boosting"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("# of itemsets", format!("{}", self.itemsets.len())),
            ("# of instances", format!("{}", self.sample.len())),
            ("Gamma", format!("{}", self.gamma)),
            ("Max rounds", format!("{}", self.max_rounds)),
            ("Seed", format!("{}", self.seed)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.model = RuleEnsemble::new();
        self.terminated = usize::MAX;

        if self.is_trivial() { return; }

        self.classes = self.sample.classes();
        checker::binary_classes(&self.classes);

        let n_sample = self.sample.len();
        self.dist = match &self.initial {
            Some(weights) => {
                checker::weights(weights, n_sample);
                let mut dist = weights.clone();
                utils::normalize(&mut dist);
                dist
            },
            None => vec![1f64 / n_sample as f64; n_sample],
        };
        self.class_dist = self.sample.class_weight_sums(&self.dist);
    }


    fn boost(&mut self, iteration: usize) -> ControlFlow<usize> {
        if self.is_trivial() {
            self.terminated = 0;
            return ControlFlow::Break(0);
        }

        if self.max_rounds < iteration {
            self.terminated = self.max_rounds;
            return ControlFlow::Break(self.max_rounds);
        }

        let (a, b) = (self.classes[0], self.classes[1]);
        let (wsum_a, wsum_b) = (self.class_dist[&a], self.class_dist[&b]);

        let dist = &self.dist;
        let covered = self.itemsets.par_iter()
            .map(|it| (it.weighted_coverage(a, dist), it.weighted_coverage(b, dist)))
            .collect::<Vec<_>>();

        // Minimize the error by maximizing its negation.
        let mut ties = Ties::new(-ERROR_BASELINE);
        let mut degenerate = false;
        for (itemset, (wsupp_a, wsupp_b)) in self.itemsets.iter().zip(covered) {
            let error_a = wsum_a - wsupp_a + wsupp_b;
            let error_b = wsum_b - wsupp_b + wsupp_a;
            let (class, error) = if error_b < error_a {
                (b, error_b)
            } else {
                (a, error_a)
            };

            if error <= 0f64 {
                degenerate = true;
                break;
            }
            ties.offer(-error, (itemset, class));
        }

        let min_error = if degenerate { 0f64 } else { -ties.best() };
        if degenerate || min_error >= 0.5 - self.gamma {
            debug!(iteration, min_error, "discrete boosting found no weak rule");
            if self.model.is_empty() {
                self.model.push(1f64, RuleClassifier::default_rule(None, 0f64));
            }
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }

        let Some((itemset, class)) = ties.choose(&mut self.rng) else {
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        };
        let h = RuleClassifier::new(Arc::clone(itemset), Some(class), 1f64);

        let alpha = self.update_params(&h, min_error);
        debug!(iteration, rule = %h, min_error, alpha, "discrete boosting picked a rule");
        self.model.push(alpha, h);

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}


impl CurrentHypothesis for DiscreteBoost<'_> {
    type Output = RuleEnsemble<RuleClassifier>;

    fn current_hypothesis(&self) -> Self::Output {
        self.model.clone()
    }
}
