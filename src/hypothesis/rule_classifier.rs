use serde::{Serialize, Deserialize};

use std::fmt;
use std::sync::Arc;

use crate::Label;
use crate::sample::Itemset;
use super::hypothesis_traits::{RuleHypothesis, Target, Vote};


/// A rule that votes inside its support and abstains elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleClassifier {
    itemset: Arc<Itemset>,
    vote: Vote,
}

impl RuleClassifier {
    /// Construct a new rule predicting `class` with `confidence`.
    pub fn new(itemset: Arc<Itemset>, class: Option<Label>, confidence: f64) -> Self {
        Self { itemset, vote: Vote::new(class, confidence) }
    }

    /// The always-firing rule used as a fallback.
    pub fn default_rule(class: Option<Label>, confidence: f64) -> Self {
        Self::new(Arc::new(Itemset::synthetic_default()), class, confidence)
    }

    /// The shared handle on the wrapped itemset.
    #[inline]
    pub fn itemset_arc(&self) -> &Arc<Itemset> {
        &self.itemset
    }

    /// Vote cast on covered targets.
    #[inline]
    pub fn vote(&self) -> Vote {
        self.vote
    }

    /// The class this rule predicts, if any.
    #[inline]
    pub fn predicted_class(&self) -> Option<Label> {
        self.vote.class
    }

    /// Confidence of the prediction.
    #[inline]
    pub fn confidence(&self) -> f64 {
        self.vote.confidence
    }

    /// Same rule, different confidence.
    pub fn with_confidence(&self, confidence: f64) -> Self {
        Self::new(Arc::clone(&self.itemset), self.vote.class, confidence)
    }
}

impl RuleHypothesis for RuleClassifier {
    fn itemset(&self) -> &Itemset {
        &self.itemset
    }

    fn classify(&self, target: Target<'_>) -> Vote {
        if self.covers(target) {
            self.vote
        } else {
            Vote::ABSTAIN
        }
    }
}

impl fmt::Display for RuleClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vote.class {
            Some(y) => write!(f, "{} -> {y} ({:.4})", self.itemset, self.vote.confidence),
            None => write!(f, "{} -> _ ({:.4})", self.itemset, self.vote.confidence),
        }
    }
}
