use serde::{Serialize, Deserialize};

use std::sync::Arc;

use crate::sample::Itemset;
use super::hypothesis_traits::{RuleHypothesis, Target, Vote};


/// A rule that splits the instance space in two:
/// one vote inside the support, another outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionClassifier {
    itemset: Arc<Itemset>,
    inside: Vote,
    outside: Vote,
}

impl PartitionClassifier {
    /// Construct a new partition classifier.
    ///
    /// The default rule has no outside: its outside vote is
    /// replaced by the inside one.
    pub fn new(itemset: Arc<Itemset>, inside: Vote, outside: Vote) -> Self {
        let outside = if itemset.is_default() { inside } else { outside };
        Self { itemset, inside, outside }
    }

    /// The always-firing partition used as a fallback.
    pub fn default_rule(vote: Vote) -> Self {
        Self::new(Arc::new(Itemset::synthetic_default()), vote, vote)
    }

    /// Vote inside the support.
    #[inline]
    pub fn inside(&self) -> Vote {
        self.inside
    }

    /// Vote outside the support.
    #[inline]
    pub fn outside(&self) -> Vote {
        self.outside
    }
}

impl RuleHypothesis for PartitionClassifier {
    fn itemset(&self) -> &Itemset {
        &self.itemset
    }

    fn classify(&self, target: Target<'_>) -> Vote {
        if self.itemset.is_default() {
            return self.outside;
        }
        if self.covers(target) { self.inside } else { self.outside }
    }
}
