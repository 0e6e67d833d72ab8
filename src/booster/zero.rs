//! Provides [`Zero`], the model made of the default rule alone.
use std::ops::ControlFlow;

use crate::{
    Booster,
    RuleClassifier,
    RuleEnsemble,
};


/// A single always-firing rule without a class.
/// Every prediction falls back to the default class of the caller.
#[derive(Default)]
pub struct Zero {
    model: RuleEnsemble<RuleClassifier>,
}


impl Zero {
    /// Initialize the `Zero`.
    pub fn init() -> Self {
        Self::default()
    }
}


impl Booster for Zero {
    type Output = RuleEnsemble<RuleClassifier>;


    fn name(&self) -> &str {
        "ZERO"
    }


    fn preprocess(&mut self) {
        self.model = RuleEnsemble::new();
    }


    fn boost(&mut self, _iteration: usize) -> ControlFlow<usize> {
        self.model.push(1f64, RuleClassifier::default_rule(None, 1f64));
        ControlFlow::Break(1)
    }


    fn postprocess(&mut self) -> Self::Output {
        self.model.clone()
    }
}
