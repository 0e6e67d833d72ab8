//! Provides [`Lac`], the lazy associative classifier,
//! after Veloso & Meira, *Demand-driven associative classification*, 2011.
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::{
    Booster,
    RuleClassifier,
    RuleEnsemble,
    Itemset,
    TrainingSet,

    common::metrics,
};


/// Every `(itemset, class)` pair becomes a rule of weight `1`
/// voting with the fraction of the support labeled `class`.
/// There is no re-weighting; the whole model is built in one round.
pub struct Lac<'a> {
    sample: &'a TrainingSet,
    itemsets: &'a [Arc<Itemset>],
    model: RuleEnsemble<RuleClassifier>,
}


impl<'a> Lac<'a> {
    /// Initialize the `Lac`.
    pub fn init(sample: &'a TrainingSet, itemsets: &'a [Arc<Itemset>]) -> Self {
        Self { sample, itemsets, model: RuleEnsemble::new() }
    }
}


impl Booster for Lac<'_> {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "Lazy Associative Classifier"
    }


    fn preprocess(&mut self) {
        self.model = RuleEnsemble::new();
    }


    fn boost(&mut self, _iteration: usize) -> ControlFlow<usize> {
        let classes = self.sample.classes();
        for itemset in self.itemsets {
            let conf = metrics::confidence(itemset, &classes);
            for &y in &classes {
                let h = RuleClassifier::new(Arc::clone(itemset), Some(y), conf[&y]);
                self.model.push(1f64, h);
            }
        }
        ControlFlow::Break(1)
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}
