//! Provides [`ConfidenceBoost`], confidence-rated boosting over
//! association rules, after Schapire & Singer,
//! *Improved boosting algorithms using confidence-rated predictions*, 1999.
use rand::prelude::*;
use rayon::prelude::*;
use tracing::debug;

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::{
    Booster,
    Label,
    PartitionClassifier,
    RuleEnsemble,
    RuleHypothesis,
    Target,
    Vote,
    Itemset,
    TrainingSet,

    common::{checker, utils, utils::Ties},
    constants::{DEFAULT_MAX_ROUNDS, DEFAULT_SEED, Z_SATURATION},
    research::CurrentHypothesis,
};


/// How a partition rates its two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidenceRule {
    /// Normalized margin `(p - 0.5) / 0.5` of the heaviest class,
    /// recomputed every round from the current weights.
    #[default]
    Margin,
    /// Raw fraction `p` of the heaviest class,
    /// recomputed every round from the current weights.
    Fraction,
    /// Raw fraction computed once from unweighted class sizes.
    /// The outside is rated by the share of the inside class.
    StaticFraction,
}


// Inside/outside votes of a candidate and its edge.
#[derive(Debug, Clone, Copy)]
struct Split {
    inside: Vote,
    outside: Vote,
    z: f64,
}


/// Confidence-rated AdaBoost for multiclass problems.
///
/// Every rule splits the instances in two:
/// the support votes for its heaviest class,
/// the complement votes for its own heaviest class.
/// With `in[y]` (resp. `out[y]`) the weight of class `y`
/// inside (resp. outside) the support, a candidate scores
/// ```txt
/// z = (2 in[p] - Σ in) conf_in + (2 out[q] - Σ out) conf_out,
/// ```
/// where `p`, `q` are the predicted classes.
/// The rule maximizing `z` is picked (ties broken uniformly at random)
/// and weighted by `alpha = ln((1 + z) / (1 - z)) / 2`.
///
/// `z` is saturated just below `1`, where `alpha` is undefined.
/// A saturated rule separates the sample and ends boosting.
///
/// # Example
/// ```no_run
/// use ruleboosts::prelude::*;
/// use ruleboosts::sample::reader;
///
/// let train = reader::read_train(&["data/train.1", "data/train.2"]).unwrap();
/// let itemsets = ItemsetReader::new(&train).read("data/itemsets").unwrap();
///
/// let f = ConfidenceBoost::init(&train, &itemsets)
///     .rule(ConfidenceRule::Fraction)
///     .max_rounds(50)
///     .run();
/// ```
pub struct ConfidenceBoost<'a> {
    sample: &'a TrainingSet,
    itemsets: &'a [Arc<Itemset>],
    classes: Vec<Label>,

    // Distribution on sample.
    dist: Vec<f64>,

    // Sum of `dist` per class.
    class_dist: BTreeMap<Label, f64>,

    initial: Option<Vec<f64>>,
    rule: ConfidenceRule,

    // Votes of `ConfidenceRule::StaticFraction`, one per itemset.
    static_votes: Vec<(Vote, Vote)>,

    seed: u64,
    rng: StdRng,
    max_rounds: usize,

    model: RuleEnsemble<PartitionClassifier>,
    terminated: usize,
}


impl<'a> ConfidenceBoost<'a> {
    /// Initialize the `ConfidenceBoost`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self {
            sample,
            itemsets,
            classes: Vec::new(),
            dist: Vec::new(),
            class_dist: BTreeMap::new(),
            initial: None,
            rule: ConfidenceRule::default(),
            static_votes: Vec::new(),
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            max_rounds: DEFAULT_MAX_ROUNDS,
            model: RuleEnsemble::new(),
            terminated: usize::MAX,
        }
    }


    /// Set the confidence rule.
    /// Default is [`ConfidenceRule::Margin`].
    pub fn rule(mut self, rule: ConfidenceRule) -> Self {
        self.rule = rule;
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


    /// Votes from unweighted class sizes.
    /// The outside votes for its own heaviest class, but is rated by
    /// the share of the inside class among the uncovered instances.
    fn static_votes(&self) -> Vec<(Vote, Vote)> {
        let sizes = self.sample.class_sizes();
        self.itemsets.iter()
            .map(|it| {
                let inside = self.classes.iter()
                    .map(|&y| it.coverage(y) as f64)
                    .collect::<Vec<_>>();
                let outside = self.classes.iter()
                    .zip(&inside)
                    .map(|(y, n)| sizes[y] as f64 - n)
                    .collect::<Vec<_>>();

                let in_vote = vote_of(&self.classes, &inside, ConfidenceRule::Fraction);
                let out_class = utils::argmax_by(
                    self.classes.iter().copied().zip(outside.iter().copied())
                );
                let total = outside.iter().sum::<f64>();
                let share = in_vote.class
                    .and_then(|p| self.classes.iter().position(|&y| y == p))
                    .map_or(0f64, |k| outside[k]);
                let out_conf = if total > 0f64 { share / total } else { 0f64 };

                (in_vote, Vote::new(out_class, out_conf))
            })
            .collect()
    }


    /// Scores every itemset under the current distribution.
    fn splits(&self) -> Vec<Split> {
        let classes = &self.classes;
        let dist = &self.dist;
        let class_dist = &self.class_dist;
        let rule = self.rule;
        let static_votes = &self.static_votes;

        self.itemsets.par_iter()
            .enumerate()
            .map(|(k, it)| {
                let inside = classes.iter()
                    .map(|&y| it.weighted_coverage(y, dist))
                    .collect::<Vec<_>>();
                // Drift may push the complement below zero.
                let outside = classes.iter()
                    .zip(&inside)
                    .map(|(y, w)| (class_dist[y] - w).max(0f64))
                    .collect::<Vec<_>>();

                let (in_vote, out_vote) = match rule {
                    ConfidenceRule::StaticFraction => static_votes[k],
                    _ => (
                        vote_of(classes, &inside, rule),
                        vote_of(classes, &outside, rule),
                    ),
                };

                let z = edge_part(classes, &inside, in_vote)
                    + edge_part(classes, &outside, out_vote);
                Split { inside: in_vote, outside: out_vote, z }
            })
            .collect()
    }


    /// Re-weight the sample by the new rule and returns its weight.
    fn update_params(&mut self, h: &PartitionClassifier, z: f64) -> f64 {
        let alpha = ((1f64 + z) / (1f64 - z)).ln() / 2f64;

        let labels = self.sample.labels();
        self.dist.par_iter_mut()
            .enumerate()
            .for_each(|(i, d)| {
                let vote = h.classify(Target::Id(i));
                let margin = if vote.is(labels[i]) { -1f64 } else { 1f64 };
                *d *= (margin * vote.confidence * alpha).exp();
            });

        utils::normalize(&mut self.dist);
        self.class_dist = self.sample.class_weight_sums(&self.dist);

        alpha
    }
}


/// The heaviest class of `masses` and its confidence under `rule`.
fn vote_of(classes: &[Label], masses: &[f64], rule: ConfidenceRule) -> Vote {
    let total = masses.iter().sum::<f64>();
    let best = utils::argmax_by(classes.iter().copied().zip(masses.iter().copied()));
    let Some(best) = best else { return Vote::ABSTAIN; };

    let mass = classes.iter()
        .position(|&y| y == best)
        .map_or(0f64, |k| masses[k]);
    let confidence = if total <= 0f64 {
        0f64
    } else {
        match rule {
            ConfidenceRule::Margin => (mass / total - 0.5) / 0.5,
            ConfidenceRule::Fraction | ConfidenceRule::StaticFraction => mass / total,
        }
    };
    Vote::new(Some(best), confidence)
}


/// `(2 mass[p] - Σ mass) conf` for the vote `p` with confidence `conf`.
fn edge_part(classes: &[Label], masses: &[f64], vote: Vote) -> f64 {
    let total = masses.iter().sum::<f64>();
    let mass = vote.class
        .and_then(|p| classes.iter().position(|&y| y == p))
        .map_or(0f64, |k| masses[k]);
    (2f64 * mass - total) * vote.confidence
}


impl Booster for ConfidenceBoost<'_> {
    type Output = RuleEnsemble<PartitionClassifier>;


    fn name(&self) -> &str {
        match self.rule {
            ConfidenceRule::Margin => "Confidence-rated Boosting",
            ConfidenceRule::Fraction => "Confidence-rated Boosting (fraction)",
            ConfidenceRule::StaticFraction => "Confidence-rated Boosting (static)",
        }
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("# of itemsets", format!("{}", self.itemsets.len())),
            ("# of instances", format!("{}", self.sample.len())),
            ("Confidence", format!("{:?}", self.rule)),
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

        self.static_votes = match self.rule {
            ConfidenceRule::StaticFraction => self.static_votes(),
            _ => Vec::new(),
        };
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

        let splits = self.splits();
        let mut ties = Ties::new(0f64);
        self.itemsets.iter()
            .zip(splits)
            .for_each(|(itemset, split)| ties.offer(split.z, (itemset, split)));

        let Some((itemset, split)) = ties.choose(&mut self.rng) else {
            debug!(iteration, "confidence-rated boosting found no positive edge");
            if self.model.is_empty() {
                self.model.push(1f64, PartitionClassifier::default_rule(Vote::ABSTAIN));
            }
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        };

        let h = PartitionClassifier::new(Arc::clone(itemset), split.inside, split.outside);

        let saturated = split.z >= 1f64 - Z_SATURATION;
        let z = split.z.min(1f64 - Z_SATURATION);
        let alpha = self.update_params(&h, z);
        debug!(iteration, itemset = %h.itemset(), z, alpha, "confidence-rated boosting picked a rule");
        self.model.push(alpha, h);

        if saturated {
            self.terminated = iteration;
            return ControlFlow::Break(iteration);
        }
        ControlFlow::Continue(())
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}


impl CurrentHypothesis for ConfidenceBoost<'_> {
    type Output = RuleEnsemble<PartitionClassifier>;

    fn current_hypothesis(&self) -> Self::Output {
        self.model.clone()
    }
}
