use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::collections::BTreeMap;

use crate::Label;
use crate::sample::Instance;
use crate::common::utils;
use super::hypothesis_traits::{RuleHypothesis, Target};


/// A struct that the boosting algorithms in this library return:
/// an ordered sequence of `(classifier, weight)` pairs.
/// You can read/write this struct by `Serde` trait.
///
/// Order matters: the prefix of length `t` is the model after `t` rounds.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RuleEnsemble<H> {
    /// Weights on each hypothesis in `self.hypotheses`.
    pub weights: Vec<f64>,
    /// Set of hypotheses.
    pub hypotheses: Vec<H>,
}

impl<H> Default for RuleEnsemble<H> {
    fn default() -> Self {
        Self { weights: Vec::new(), hypotheses: Vec::new() }
    }
}

impl<H> RuleEnsemble<H> {
    /// Construct an empty ensemble.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair `(weight, H)` to the current ensemble.
    #[inline]
    pub fn push(&mut self, weight: f64, hypothesis: H) {
        self.weights.push(weight);
        self.hypotheses.push(hypothesis);
    }

    /// Number of rules (= rounds).
    #[inline]
    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    /// Returns `true` if no rule was added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }

    /// Iterate over `(hypothesis, weight)` in round order.
    pub fn iter(&self) -> impl Iterator<Item = (&H, f64)> {
        self.hypotheses.iter().zip(self.weights.iter().copied())
    }

    /// Decompose the ensemble
    /// into the two vectors `Vec<f64>` and `Vec<H>`
    #[inline]
    pub fn decompose(self) -> (Vec<f64>, Vec<H>) {
        (self.weights, self.hypotheses)
    }
}

impl<H: Clone> RuleEnsemble<H> {
    /// The model after the first `rounds` rounds.
    pub fn prefix(&self, rounds: usize) -> Self {
        let rounds = rounds.min(self.len());
        Self {
            weights: self.weights[..rounds].to_vec(),
            hypotheses: self.hypotheses[..rounds].to_vec(),
        }
    }
}

impl<H> RuleEnsemble<H>
    where H: RuleHypothesis,
{
    /// The leading class after each round.
    ///
    /// Every rule voting for a class adds `confidence * weight` to
    /// the score of that class.
    /// If `average` is `true`, classes are ranked by their mean
    /// contribution instead of their total score.
    /// Ties go to the smallest label.
    pub fn predict_each_round(&self, target: Target<'_>, average: bool)
        -> Vec<Option<Label>>
    {
        let mut tally: BTreeMap<Label, (f64, f64)> = BTreeMap::new();
        self.iter()
            .map(|(h, alpha)| {
                let vote = h.classify(target);
                if let Some(y) = vote.class {
                    let (score, count) = tally.entry(y).or_insert((0f64, 0f64));
                    *score += vote.confidence * alpha;
                    *count += 1f64;
                }
                leader(&tally, average)
            })
            .collect()
    }

    /// Per-round predictions padded to `ceiling` entries
    /// by repeating the last one.
    /// An empty ensemble predicts `None` every round.
    pub fn predict_rounds(&self, target: Target<'_>, average: bool, ceiling: usize)
        -> Vec<Option<Label>>
    {
        let mut predictions = self.predict_each_round(target, average);
        let last = predictions.last().copied().flatten();
        if predictions.len() < ceiling {
            predictions.resize(ceiling, last);
        }
        predictions
    }

    /// The final prediction, `None` if no rule voted.
    pub fn predict(&self, target: Target<'_>, average: bool) -> Option<Label> {
        self.predict_each_round(target, average)
            .pop()
            .flatten()
    }

    /// Final predictions for every instance.
    pub fn predict_all(&self, instances: &[Instance], average: bool)
        -> Vec<Option<Label>>
        where H: Sync,
    {
        instances.par_iter()
            .map(|x| self.predict(Target::Instance(x), average))
            .collect()
    }
}

fn leader(tally: &BTreeMap<Label, (f64, f64)>, average: bool) -> Option<Label> {
    let values = tally.iter()
        .map(|(y, (score, count))| {
            let value = if average { score / count } else { *score };
            (*y, value)
        });
    utils::argmax_by(values)
}
