use serde::{Serialize, Deserialize};

use crate::Label;
use crate::sample::{Instance, Itemset};


/// What a rule is asked to classify.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A feature-bearing instance, matched against the patterns.
    Instance(&'a Instance),
    /// A training instance, matched against the precomputed support.
    Id(usize),
}

impl<'a> From<&'a Instance> for Target<'a> {
    fn from(instance: &'a Instance) -> Self {
        Target::Instance(instance)
    }
}

impl From<usize> for Target<'_> {
    fn from(id: usize) -> Self {
        Target::Id(id)
    }
}


/// A `(predicted class, confidence)` pair.
/// `class == None` means the rule does not vote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Predicted class, `None` to abstain.
    pub class: Option<Label>,
    /// Confidence of the prediction.
    pub confidence: f64,
}

impl Vote {
    /// No class, no confidence.
    pub const ABSTAIN: Vote = Vote { class: None, confidence: 0f64 };

    /// Construct a new vote.
    #[inline]
    pub fn new(class: Option<Label>, confidence: f64) -> Self {
        Self { class, confidence }
    }

    /// Returns `true` if `self` predicts the class `y`.
    #[inline]
    pub fn is(&self, y: Label) -> bool {
        self.class == Some(y)
    }
}


/// A trait that defines the behavior of a rule-based classifier.
/// You only need to implement `itemset` and `classify`.
pub trait RuleHypothesis {
    /// The wrapped itemset.
    fn itemset(&self) -> &Itemset;


    /// Classify the target.
    /// This is a pure function of the wrapped itemset.
    fn classify(&self, target: Target<'_>) -> Vote;


    /// Returns `true` if the rule covers the target.
    /// The default rule covers everything.
    fn covers(&self, target: Target<'_>) -> bool {
        let itemset = self.itemset();
        if itemset.is_default() { return true; }
        match target {
            Target::Instance(x) => itemset.covers(x.features()),
            Target::Id(i) => itemset.covers_id(i),
        }
    }
}
