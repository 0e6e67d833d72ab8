use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::Label;
use crate::common::checker;

/// A set of feature identifiers.
pub type Pattern = BTreeSet<usize>;

/// Per-class coverage of a rule.
/// The `i`-th bit of `support[&y]` is set
/// iff the training instance `i` has label `y` and is covered by the rule.
pub type Support = BTreeMap<Label, FixedBitSet>;

/// A mined candidate rule with precomputed per-class coverage.
///
/// An itemset holds one or more patterns.
/// Several patterns arise when mined rules sharing the same coverage
/// are merged into one equivalence class (see [`Itemset::append`]).
/// A target is covered if **any** of the patterns is a subset of
/// its features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Itemset {
    id: i64,
    patterns: Vec<Pattern>,
    support: Support,

    // Union of the per-class supports.
    cover: FixedBitSet,

    is_default: bool,
}

impl Itemset {
    /// Identifier of the synthetic default rule.
    pub const DEFAULT_ID: i64 = -1;

    /// Construct a new itemset from a single pattern.
    ///
    /// # Panics
    /// Panics if an instance appears in the support of two classes.
    pub fn new(id: i64, pattern: Pattern, support: Support) -> Self {
        checker::disjoint_support(&support);
        let cover = union_of(&support);
        Self {
            id,
            patterns: vec![pattern],
            support,
            cover,
            is_default: false,
        }
    }

    /// Construct the universal rule, which covers every instance.
    /// `support` is either empty or the whole training set split by class.
    pub fn default_rule(support: Support) -> Self {
        let mut itemset = Self::new(Self::DEFAULT_ID, Pattern::new(), support);
        itemset.is_default = true;
        itemset
    }

    /// The default rule with no coverage information.
    /// Boosters fall back to it when no rule is worth adding.
    pub fn synthetic_default() -> Self {
        Self::default_rule(Support::new())
    }

    /// Mark `self` as the universal rule, keeping its identifier.
    pub fn into_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Append a pattern sharing the coverage of `self`.
    ///
    /// If `free` is `true`, only the minimal patterns are kept:
    /// stored patterns containing `pattern` are dropped, and `pattern`
    /// itself is ignored when a stored pattern is a strict subset of it.
    pub fn append(&mut self, pattern: Pattern, free: bool) {
        if free {
            let dominated = self.patterns.iter()
                .any(|p| p.len() < pattern.len() && p.is_subset(&pattern));
            if dominated { return; }

            self.patterns.retain(|p| !pattern.is_subset(p));
        }
        self.patterns.push(pattern);
    }

    /// Identifier, or [`Itemset::DEFAULT_ID`].
    #[inline]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Patterns sharing this coverage.
    #[inline]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Lengths of the stored patterns.
    pub fn size(&self) -> Vec<usize> {
        self.patterns.iter().map(|p| p.len()).collect()
    }

    /// Returns `true` for the universal rule.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Per-class supports, in ascending label order.
    #[inline]
    pub fn support_map(&self) -> &Support {
        &self.support
    }

    /// Support of the class `y`, if any instance of `y` is recorded.
    #[inline]
    pub fn support(&self, y: Label) -> Option<&FixedBitSet> {
        self.support.get(&y)
    }

    /// Training instances of class `y` covered by `self`.
    pub fn covered(&self, y: Label) -> impl Iterator<Item = usize> + '_ {
        self.support(y)
            .into_iter()
            .flat_map(|bits| bits.ones())
    }

    /// Number of instances of class `y` covered by `self`.
    #[inline]
    pub fn coverage(&self, y: Label) -> usize {
        self.support(y).map_or(0, |bits| bits.count_ones(..))
    }

    /// Number of instances covered by `self`.
    #[inline]
    pub fn total_coverage(&self) -> usize {
        self.cover.count_ones(..)
    }

    /// Sum of `weights[i]` over the instances of class `y` in the support.
    pub fn weighted_coverage(&self, y: Label, weights: &[f64]) -> f64 {
        self.covered(y)
            .map(|i| weights[i])
            .sum::<f64>()
    }

    /// Returns `true` if the training instance `id` is in the support.
    #[inline]
    pub fn covers_id(&self, id: usize) -> bool {
        self.cover.contains(id)
    }

    /// Returns `true` if some pattern is a subset of `features`.
    pub fn covers(&self, features: &Pattern) -> bool {
        self.patterns.iter().any(|p| p.is_subset(features))
    }
}

impl fmt::Display for Itemset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns = self.patterns.iter()
            .map(|p| {
                let items = p.iter()
                    .map(|x| x.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{{{items}}}")
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let counts = self.support.iter()
            .map(|(y, bits)| format!("{y}:{}", bits.count_ones(..)))
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "r{} [{patterns}] ({counts})", self.id)
    }
}

fn union_of(support: &Support) -> FixedBitSet {
    let mut cover = FixedBitSet::new();
    support.values()
        .for_each(|bits| cover.union_with(bits));
    cover
}

/// Build a [`Support`] from `(label, instance ids)` pairs.
/// Convenient for hand-written itemsets.
pub fn support_from<I, J>(entries: I) -> Support
    where I: IntoIterator<Item = (Label, J)>,
          J: IntoIterator<Item = usize>,
{
    entries.into_iter()
        .map(|(y, ids)| {
            let ids = ids.into_iter().collect::<Vec<_>>();
            let len = ids.iter().max().map_or(0, |m| m + 1);
            let mut bits = FixedBitSet::with_capacity(len);
            ids.into_iter().for_each(|i| bits.insert(i));
            (y, bits)
        })
        .collect()
}
