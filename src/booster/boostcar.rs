//! Provides [`BoostCar`] and [`ExperimentalBoostCar`],
//! after Yoon & Lee, *Text categorization based on boosting association rules*, 2008.
use fixedbitset::FixedBitSet;
use rand::prelude::*;
use tracing::debug;

use std::ops::ControlFlow;
use std::sync::Arc;

use crate::{
    Booster,
    Label,
    RuleClassifier,
    RuleEnsemble,
    Itemset,
    TrainingSet,

    common::metrics,
    constants::{
        DEFAULT_COVERAGE_THRESHOLD,
        DEFAULT_SEED,
        DEFAULT_WEIGHT_CUTOFF,
    },
    research::CurrentHypothesis,
};


/// Greedy coverage over association rules.
///
/// Every `(itemset, class)` pair becomes a rule whose confidence is
/// the fraction of the itemset's support labeled `class`.
/// The rules are visited once, by decreasing confidence.
/// A rule joins the model if it covers some active instance of its class.
/// Each such instance accumulates the confidence of the rule
/// and leaves the active set once the total exceeds the coverage threshold.
///
/// Round `t` visits the `t`-th rule;
/// boosting stops when the rules run out or no instance is active.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
///
/// let f = BoostCar::init(&train, &itemsets)
///     .coverage_threshold(2.0)
///     .run();
/// ```
pub struct BoostCar<'a> {
    sample: &'a TrainingSet,
    itemsets: &'a [Arc<Itemset>],

    // Candidate rules by decreasing confidence.
    ranked: Vec<RuleClassifier>,

    // Instances still worth covering.
    active: FixedBitSet,

    // Cumulative confidence per instance.
    covers: Vec<f64>,

    threshold: f64,

    model: RuleEnsemble<RuleClassifier>,
    terminated: usize,
}


impl<'a> BoostCar<'a> {
    /// Initialize the `BoostCar`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self {
            sample,
            itemsets,
            ranked: Vec::new(),
            active: FixedBitSet::new(),
            covers: Vec::new(),
            threshold: DEFAULT_COVERAGE_THRESHOLD,
            model: RuleEnsemble::new(),
            terminated: usize::MAX,
        }
    }


    /// Set the cumulative confidence
    /// above which an instance leaves the active set.
    pub fn coverage_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }


    /// Returns the iteration at which boosting stopped.
    pub fn terminated(&self) -> usize {
        self.terminated
    }


    /// Number of instances still active.
    pub fn n_active(&self) -> usize {
        self.active.count_ones(..)
    }
}


impl Booster for BoostCar<'_> {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "BoostCAR"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("# of itemsets", format!("{}", self.itemsets.len())),
            ("# of instances", format!("{}", self.sample.len())),
            ("Coverage threshold", format!("{}", self.threshold)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) {
        self.model = RuleEnsemble::new();
        self.terminated = usize::MAX;

        let classes = self.sample.classes();
        self.ranked = ranked_rules(self.itemsets, &classes);

        let n_sample = self.sample.len();
        self.active = FixedBitSet::with_capacity(n_sample);
        self.active.insert_range(..);
        self.covers = vec![0f64; n_sample];
    }


    fn boost(&mut self, iteration: usize) -> ControlFlow<usize> {
        if self.sample.is_empty() || self.active.count_ones(..) == 0 {
            self.terminated = iteration - 1;
            return ControlFlow::Break(iteration - 1);
        }

        let Some(h) = self.ranked.get(iteration - 1) else {
            self.terminated = iteration - 1;
            return ControlFlow::Break(iteration - 1);
        };
        let Some(class) = h.predicted_class() else {
            return ControlFlow::Continue(());
        };

        let labels = self.sample.labels();
        let mut correct = false;
        let mut leaving = Vec::new();
        for i in h.itemset_arc().covered(class) {
            if !self.active[i] || labels[i] != class { continue; }

            correct = true;
            self.covers[i] += h.confidence();
            if self.covers[i] > self.threshold {
                leaving.push(i);
            }
        }
        leaving.into_iter()
            .for_each(|i| self.active.set(i, false));

        if correct {
            debug!(iteration, rule = %h, active = self.n_active(), "BoostCAR kept a rule");
            self.model.push(1f64, h.clone());
        }

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}


impl CurrentHypothesis for BoostCar<'_> {
    type Output = RuleEnsemble<RuleClassifier>;

    fn current_hypothesis(&self) -> Self::Output {
        self.model.clone()
    }
}


/// One rule per `(itemset, class)` with its static confidence,
/// by decreasing confidence.
/// Equal confidences keep the itemset order, then the class order.
fn ranked_rules(itemsets: &[Arc<Itemset>], classes: &[Label]) -> Vec<RuleClassifier> {
    let mut rules = itemsets.iter()
        .flat_map(|it| {
            let conf = metrics::confidence(it, classes);
            classes.iter()
                .map(move |&y| RuleClassifier::new(Arc::clone(it), Some(y), conf[&y]))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    rules.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));
    rules
}


/// The randomized BoostCAR.
///
/// Itemsets are visited once in a seeded random order.
/// Every instance carries a weight starting at `1`.
/// For each class, a rule `(itemset, class)` that covers an active instance
/// of that class joins the model and
/// multiplies the weight of each such instance by `exp(-conf)`.
/// An instance leaves once its weight falls below the cutoff.
/// The weights only decay; they are never normalized.
pub struct ExperimentalBoostCar<'a> {
    sample: &'a TrainingSet,
    itemsets: &'a [Arc<Itemset>],
    classes: Vec<Label>,

    // Visiting order of the itemsets.
    order: Vec<usize>,

    active: FixedBitSet,
    weights: Vec<f64>,
    cutoff: f64,

    seed: u64,

    model: RuleEnsemble<RuleClassifier>,
    terminated: usize,
}


impl<'a> ExperimentalBoostCar<'a> {
    /// Initialize the `ExperimentalBoostCar`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self {
            sample,
            itemsets,
            classes: Vec::new(),
            order: Vec::new(),
            active: FixedBitSet::new(),
            weights: Vec::new(),
            cutoff: DEFAULT_WEIGHT_CUTOFF,
            seed: DEFAULT_SEED,
            model: RuleEnsemble::new(),
            terminated: usize::MAX,
        }
    }


    /// Set the weight below which an instance leaves.
    pub fn weight_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }


    /// Set the seed of the shuffle.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Returns the iteration at which boosting stopped.
    pub fn terminated(&self) -> usize {
        self.terminated
    }


    /// Current weight of each training instance.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }


    /// Number of instances still active.
    pub fn n_active(&self) -> usize {
        self.active.count_ones(..)
    }
}


impl Booster for ExperimentalBoostCar<'_> {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "BoostCAR (experimental)"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("# of itemsets", format!("{}", self.itemsets.len())),
            ("# of instances", format!("{}", self.sample.len())),
            ("Weight cutoff", format!("{}", self.cutoff)),
            ("Seed", format!("{}", self.seed)),
        ]);
        Some(info)
    }


    fn preprocess(&mut self) {
        self.model = RuleEnsemble::new();
        self.terminated = usize::MAX;

        self.classes = self.sample.classes();

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.order = (0..self.itemsets.len()).collect();
        self.order.shuffle(&mut rng);

        let n_sample = self.sample.len();
        self.active = FixedBitSet::with_capacity(n_sample);
        self.active.insert_range(..);
        self.weights = vec![1f64; n_sample];
    }


    fn boost(&mut self, iteration: usize) -> ControlFlow<usize> {
        if self.sample.is_empty() || self.active.count_ones(..) == 0 {
            self.terminated = iteration - 1;
            return ControlFlow::Break(iteration - 1);
        }

        let Some(&k) = self.order.get(iteration - 1) else {
            self.terminated = iteration - 1;
            return ControlFlow::Break(iteration - 1);
        };
        let itemset = &self.itemsets[k];
        let conf = metrics::confidence(itemset, &self.classes);
        let labels = self.sample.labels();

        for &y in &self.classes {
            let decay = (-conf[&y]).exp();
            let mut correct = false;
            let mut leaving = Vec::new();
            for i in itemset.covered(y) {
                if !self.active[i] || labels[i] != y { continue; }

                correct = true;
                self.weights[i] *= decay;
                if self.weights[i] < self.cutoff {
                    leaving.push(i);
                }
            }
            leaving.into_iter()
                .for_each(|i| self.active.set(i, false));

            if correct {
                let h = RuleClassifier::new(Arc::clone(itemset), Some(y), conf[&y]);
                debug!(iteration, rule = %h, "experimental BoostCAR kept a rule");
                self.model.push(1f64, h);
            }

            if self.active.count_ones(..) == 0 {
                self.terminated = iteration;
                return ControlFlow::Break(iteration);
            }
        }

        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}


impl CurrentHypothesis for ExperimentalBoostCar<'_> {
    type Output = RuleEnsemble<RuleClassifier>;

    fn current_hypothesis(&self) -> Self::Output {
        self.model.clone()
    }
}

