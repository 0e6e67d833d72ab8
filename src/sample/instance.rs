use serde::{Serialize, Deserialize};

use crate::Label;
use super::itemset::Pattern;

/// A held-out instance: an identifier, a set of discrete features,
/// and its true label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    id: usize,
    features: Pattern,
    label: Label,
}

impl Instance {
    /// Construct a new instance.
    pub fn new<I>(id: usize, features: I, label: Label) -> Self
        where I: IntoIterator<Item = usize>,
    {
        Self {
            id,
            features: features.into_iter().collect(),
            label,
        }
    }

    /// Position of the instance in its file.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Feature ids of the instance.
    #[inline]
    pub fn features(&self) -> &Pattern {
        &self.features
    }

    /// True label.
    #[inline]
    pub fn label(&self) -> Label {
        self.label
    }
}
