use fixedbitset::FixedBitSet;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::Label;
use super::itemset::Support;

/// Labeled training instances.
///
/// Instances are addressed by their dense index `0..len()`,
/// which is the key space of every weight vector and support bitset
/// in this crate.
/// The original instance names are kept to resolve
/// itemset supports and similarity weights read from files.
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
    labels: Vec<Label>,
    classes: BTreeSet<Label>,
}

impl TrainingSet {
    /// Construct an empty training set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a training set from labels.
    /// The `i`-th instance is named `i`.
    pub fn from_labels<I>(labels: I) -> Self
        where I: IntoIterator<Item = Label>,
    {
        let mut train = Self::new();
        labels.into_iter()
            .enumerate()
            .for_each(|(i, y)| { train.push(i.to_string(), y); });
        train
    }

    /// Add an instance and return its index.
    /// Pushing a known name relabels the existing instance.
    pub fn push<S: Into<String>>(&mut self, name: S, label: Label) -> usize {
        let name = name.into();
        self.classes.insert(label);
        if let Some(&i) = self.index.get(&name) {
            self.labels[i] = label;
            return i;
        }

        let i = self.labels.len();
        self.index.insert(name.clone(), i);
        self.names.push(name);
        self.labels.push(label);
        i
    }

    /// Declare a class, even if no instance carries it.
    pub fn add_class(&mut self, label: Label) {
        self.classes.insert(label);
    }

    /// Returns the number of instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if there is no instance.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of the `i`-th instance.
    #[inline]
    pub fn label(&self, i: usize) -> Label {
        self.labels[i]
    }

    /// Labels, indexed by instance.
    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Classes in ascending order.
    pub fn classes(&self) -> Vec<Label> {
        self.classes.iter().copied().collect()
    }

    /// Number of classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Index of the instance named `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name of the `i`-th instance.
    #[inline]
    pub fn name(&self, i: usize) -> &str {
        &self.names[i]
    }

    /// Number of instances of each class.
    pub fn class_sizes(&self) -> BTreeMap<Label, usize> {
        let mut sizes = self.classes.iter()
            .map(|&y| (y, 0_usize))
            .collect::<BTreeMap<_, _>>();
        self.labels.iter()
            .for_each(|y| { *sizes.entry(*y).or_default() += 1; });
        sizes
    }

    /// The class with the most training instances.
    /// Ties go to the smallest label.
    pub fn default_class(&self) -> Option<Label> {
        let sizes = self.class_sizes()
            .into_iter()
            .map(|(y, n)| (y, n as f64))
            .collect::<BTreeMap<_, _>>();
        crate::common::utils::argmax(&sizes)
    }

    /// Sum of `weights` per class, in ascending label order.
    pub fn class_weight_sums(&self, weights: &[f64]) -> BTreeMap<Label, f64> {
        let mut sums = self.classes.iter()
            .map(|&y| (y, 0f64))
            .collect::<BTreeMap<_, _>>();
        self.labels.iter()
            .zip(weights)
            .for_each(|(y, w)| { *sums.entry(*y).or_default() += *w; });
        sums
    }

    /// Support of the universal rule: every instance, split by class.
    pub fn full_support(&self) -> Support {
        let n_sample = self.len();
        let mut support = self.classes.iter()
            .map(|&y| (y, FixedBitSet::with_capacity(n_sample)))
            .collect::<Support>();
        self.labels.iter()
            .enumerate()
            .for_each(|(i, y)| {
                if let Some(bits) = support.get_mut(y) { bits.insert(i); }
            });
        support
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_lookup() {
        let mut train = TrainingSet::new();
        assert_eq!(train.push("a", 2), 0);
        assert_eq!(train.push("b", 1), 1);
        assert_eq!(train.push("a", 1), 0);
        train.add_class(5);

        assert_eq!(train.len(), 2);
        assert_eq!(train.labels(), &[1, 1]);
        assert_eq!(train.classes(), vec![1, 2, 5]);
        assert_eq!(train.index_of("b"), Some(1));
        assert_eq!(train.class_sizes().get(&5), Some(&0));
    }

    #[test]
    fn default_class_prefers_smallest_label_on_ties() {
        let train = TrainingSet::from_labels([3, 1, 3, 1, 2]);
        assert_eq!(train.default_class(), Some(1));

        let train = TrainingSet::from_labels([3, 1, 3]);
        assert_eq!(train.default_class(), Some(3));
    }

    #[test]
    fn full_support_splits_by_class() {
        let train = TrainingSet::from_labels([1, 2, 1]);
        let support = train.full_support();
        assert_eq!(support[&1].ones().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(support[&2].ones().collect::<Vec<_>>(), vec![1]);
    }
}
