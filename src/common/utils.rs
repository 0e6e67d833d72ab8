//! This file provides some common functions
//! such as normalization and tie-aware selection.
use rand::Rng;

use std::collections::BTreeMap;

use crate::Label;


/// Returns the first label with the largest value,
/// scanning labels in ascending order.
/// Returns `None` for an empty map.
pub fn argmax(values: &BTreeMap<Label, f64>) -> Option<Label> {
    argmax_by(values.iter().map(|(y, v)| (*y, *v)))
}


/// Returns the first key with the largest value.
pub fn argmax_by<I>(values: I) -> Option<Label>
    where I: IntoIterator<Item = (Label, f64)>,
{
    let mut best: Option<(Label, f64)> = None;
    for (y, v) in values {
        match best {
            Some((_, b)) if v <= b => {},
            _ => { best = Some((y, v)); },
        }
    }
    best.map(|(y, _)| y)
}


/// Scale `weights` so that they sum to one.
/// Returns the normalizer.
/// A zero (or negative) total leaves `weights` untouched.
pub fn normalize(weights: &mut [f64]) -> f64 {
    let normalizer = weights.iter().sum::<f64>();
    if normalizer > 0f64 {
        weights.iter_mut()
            .for_each(|w| { *w /= normalizer; });
    }
    normalizer
}


/// The best candidates seen so far.
///
/// A candidate is kept only if its score strictly beats the baseline.
/// A strictly larger score resets the collection,
/// an equal score joins it.
#[derive(Debug, Clone)]
pub struct Ties<T> {
    best: f64,
    items: Vec<T>,
}

impl<T> Ties<T> {
    /// Construct an empty collection with the given baseline.
    pub fn new(baseline: f64) -> Self {
        Self { best: baseline, items: Vec::new() }
    }

    /// Offer a candidate.
    pub fn offer(&mut self, score: f64, item: T) {
        if score > self.best {
            self.best = score;
            self.items.clear();
            self.items.push(item);
        } else if score == self.best && !self.items.is_empty() {
            self.items.push(item);
        }
    }

    /// Best score so far, or the baseline.
    #[inline]
    pub fn best(&self) -> f64 {
        self.best
    }

    /// Number of tied candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no candidate beat the baseline.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pick one of the best candidates uniformly at random.
    pub fn choose<R: Rng>(mut self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() { return None; }
        let k = rng.gen_range(0..self.items.len());
        Some(self.items.swap_remove(k))
    }
}
