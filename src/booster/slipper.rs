//! Provides [`Slipper`], after Cohen & Singer,
//! *A simple, fast, and effective rule learner*, 1999.
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
    Itemset,
    TrainingSet,

    common::{checker, utils::Ties},
    constants::{DEFAULT_MAX_ROUNDS, DEFAULT_SEED},
    research::CurrentHypothesis,
};


/// SLIPPER for binary and multiclass problems.
///
/// Each round normalizes the instance weights together with an optional
/// **extra mass** per class, standing for instances that exist
/// but are not part of the training set:
/// ```txt
/// extra[y] = eweight[y] * count[y].
/// ```
/// A candidate covering the weights `w[pos] >= w[neg]`
/// of its two heaviest classes scores `g = √w[pos] - √w[neg]`.
/// The default rule sees the whole sample plus the extra mass.
/// The best rule predicts `pos` with confidence
/// ```txt
/// conf = ln((w[pos] + s) / (w[neg] + s)) / 2,   s = 1 / (2 m),
/// ```
/// and only the instances it covers are re-weighted by `exp(∓conf)`.
/// The default rule also re-weights the extra mass.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
/// let sizes = reader::read_sizes("data/sizes").unwrap();
///
/// let f = Slipper::init(&train, &itemsets)
///     .extra_mass(Slipper::extra_from_sizes(&train, &sizes))
///     .max_rounds(50)
///     .run();
/// ```
pub struct Slipper<'a> {
    sample: &'a TrainingSet,
    itemsets: &'a [Arc<Itemset>],
    classes: Vec<Label>,

    // Weights on sample.
    dist: Vec<f64>,

    // Number of unseen instances per class.
    extra: BTreeMap<Label, f64>,

    // Weight of one unseen instance per class.
    extra_weights: BTreeMap<Label, f64>,

    initial: Option<Vec<f64>>,

    // Smoothing term of the confidence.
    smooth: f64,

    seed: u64,
    rng: StdRng,
    max_rounds: usize,

    model: RuleEnsemble<RuleClassifier>,
    terminated: usize,
}


impl<'a> Slipper<'a> {
    /// Initialize the `Slipper`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self {
            sample,
            itemsets,
            classes: Vec::new(),
            dist: Vec::new(),
            extra: BTreeMap::new(),
            extra_weights: BTreeMap::new(),
            initial: None,
            smooth: 0f64,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            max_rounds: DEFAULT_MAX_ROUNDS,
            model: RuleEnsemble::new(),
            terminated: usize::MAX,
        }
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


    /// Start from the given weights (e.g., similarities)
    /// instead of the uniform distribution.
    pub fn initial_weights(mut self, weights: Vec<f64>) -> Self {
        self.initial = Some(weights);
        self
    }


    /// Set the number of unseen instances per class.
    /// Classes absent from `extra` get none.
    pub fn extra_mass(mut self, extra: BTreeMap<Label, f64>) -> Self {
        self.extra = extra;
        self
    }


    /// Unseen instances per class:
    /// the original class sizes minus the training class sizes.
    pub fn extra_from_sizes(sample: &TrainingSet, original: &BTreeMap<Label, usize>)
        -> BTreeMap<Label, f64>
    {
        sample.class_sizes()
            .into_iter()
            .map(|(y, n)| {
                let total = original.get(&y).copied().unwrap_or(n);
                (y, total.saturating_sub(n) as f64)
            })
            .collect()
    }


    /// Returns the iteration at which boosting stopped.
    pub fn terminated(&self) -> usize {
        self.terminated
    }


    /// Current weights on the training instances.
    pub fn distribution(&self) -> &[f64] {
        &self.dist
    }


    /// Current weight of one unseen instance, per class.
    pub fn extra_weights(&self) -> &BTreeMap<Label, f64> {
        &self.extra_weights
    }


    fn is_trivial(&self) -> bool {
        self.sample.is_empty() || self.itemsets.is_empty()
    }


    fn extra_of(&self, y: Label) -> f64 {
        self.extra_weights[&y] * self.extra.get(&y).copied().unwrap_or(0f64)
    }


    /// Scale the instance weights and the extra weights so that
    /// they sum to one together. Returns the normalizer.
    fn normalize(&mut self) -> f64 {
        let normalizer = self.dist.iter().sum::<f64>()
            + self.classes.iter().map(|&y| self.extra_of(y)).sum::<f64>();

        if normalizer > 0f64 {
            self.dist.iter_mut()
                .for_each(|d| { *d /= normalizer; });
            self.extra_weights.values_mut()
                .for_each(|e| { *e /= normalizer; });
        }
        normalizer
    }


    /// Weight of each class over the sample plus the extra mass.
    fn class_totals(&self) -> Vec<f64> {
        let sums = self.sample.class_weight_sums(&self.dist);
        self.classes.iter()
            .map(|&y| sums[&y] + self.extra_of(y))
            .collect()
    }


    /// `(pos, w[pos], neg, w[neg])` for every itemset.
    fn candidates(&self) -> Vec<(Label, f64, Label, f64)> {
        let totals = self.class_totals();
        let classes = &self.classes;
        let dist = &self.dist;

        self.itemsets.par_iter()
            .map(|it| {
                let masses = if it.is_default() {
                    totals.clone()
                } else {
                    classes.iter()
                        .map(|&y| it.weighted_coverage(y, dist).max(0f64))
                        .collect::<Vec<_>>()
                };

                // Stable: equal masses keep the ascending label order.
                let mut order = (0..classes.len()).collect::<Vec<_>>();
                order.sort_by(|&i, &j| masses[j].total_cmp(&masses[i]));
                let (p, n) = (order[0], order[1]);
                (classes[p], masses[p], classes[n], masses[n])
            })
            .collect()
    }


    /// Multiply the weights of the instances covered by `h`.
    fn update_params(&mut self, h: &RuleClassifier) {
        let pred = h.predicted_class();
        let conf = h.confidence();
        let (right, wrong) = ((-conf).exp(), conf.exp());

        if h.itemset_arc().is_default() {
            let labels = self.sample.labels();
            self.dist.par_iter_mut()
                .zip(labels)
                .for_each(|(d, y)| {
                    *d *= if pred == Some(*y) { right } else { wrong };
                });
            self.extra_weights.iter_mut()
                .for_each(|(y, e)| {
                    *e *= if pred == Some(*y) { right } else { wrong };
                });
            return;
        }

        let itemset = Arc::clone(h.itemset_arc());
        for &y in &self.classes {
            let factor = if pred == Some(y) { right } else { wrong };
            itemset.covered(y)
                .for_each(|i| { self.dist[i] *= factor; });
        }
    }


    fn fallback(&mut self) {
        if self.model.is_empty() {
            self.model.push(1f64, RuleClassifier::default_rule(None, 1f64));
        }
    }
}


impl Booster for Slipper<'_> {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "SLIPPER"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let extra = self.extra.values().sum::<f64>();
        let info = Vec::from([
            ("# of itemsets", format!("{}", self.itemsets.len())),
            ("# of instances", format!("{}", self.sample.len())),
            ("Extra mass", format!("{extra}")),
            ("Custom weights", format!("{}", self.initial.is_some())),
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
        let n_sample = self.sample.len();
        self.smooth = 1f64 / (2f64 * n_sample as f64);
        self.dist = match &self.initial {
            Some(weights) => {
                checker::weights(weights, n_sample);
                weights.clone()
            },
            None => vec![1f64 / n_sample as f64; n_sample],
        };
        self.extra_weights = self.classes.iter()
            .map(|&y| (y, 1f64))
            .collect();
    }


    fn boost(&mut self, iteration: usize) -> ControlFlow<usize> {
        if self.is_trivial() {
            self.terminated = 0;
            return ControlFlow::Break(0);
        }

        // Nothing to separate.
        if self.classes.len() < 2 {
            let class = self.classes.first().copied();
            self.model.push(1f64, RuleClassifier::default_rule(class, 1f64));
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }

        if self.max_rounds < iteration {
            self.terminated = self.max_rounds;
            return ControlFlow::Break(self.max_rounds);
        }

        if self.normalize() <= 0f64 {
            debug!(iteration, "SLIPPER ran out of weight");
            self.fallback();
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }

        let candidates = self.candidates();
        let mut ties = Ties::new(0f64);
        self.itemsets.iter()
            .zip(candidates)
            .for_each(|(itemset, (pos, wpos, neg, wneg))| {
                let g = wpos.sqrt() - wneg.sqrt();
                ties.offer(g, (itemset, pos, wpos, neg, wneg));
            });

        let Some((itemset, pos, wpos, neg, wneg)) = ties.choose(&mut self.rng) else {
            debug!(iteration, "SLIPPER found no rule with a positive objective");
            self.fallback();
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        };

        let conf = ((wpos + self.smooth) / (wneg + self.smooth)).ln() / 2f64;
        let class = if conf > 0f64 {
            Some(pos)
        } else if conf < 0f64 {
            Some(neg)
        } else {
            None
        };
        let h = RuleClassifier::new(Arc::clone(itemset), class, conf.abs());

        self.update_params(&h);
        debug!(iteration, rule = %h, "SLIPPER picked a rule");
        self.model.push(1f64, h);

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}


impl CurrentHypothesis for Slipper<'_> {
    type Output = RuleEnsemble<RuleClassifier>;

    fn current_hypothesis(&self) -> Self::Output {
        self.model.clone()
    }
}
