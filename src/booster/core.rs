//! Provides `Booster` trait.

use std::ops::ControlFlow;


/// The trait [`Booster`] defines the standard framework of rule boosting.
///
/// In each round `t = 1, 2, ...`,
/// 1. Booster holds a distribution over the training instances.
/// 2. Booster scans the candidate itemsets and picks the rule
///    that best improves its objective under that distribution.
/// 3. Booster folds the rule into the ensemble and re-weights the instances.
///
/// # Required Methods
/// - [`Booster::name`]
/// - [`Booster::preprocess`]
/// - [`Booster::boost`]
/// - [`Booster::postprocess`]
/// - [`Booster::info`] ... optional.
///
/// # Provided Methods
/// - [`Booster::run`]
pub trait Booster {
    /// The final hypothesis output by a boosting algorithm.
    type Output;


    /// Returns the name of the boosting algorithm.
    fn name(&self) -> &str;


    /// Returns the information of boosting algorithm as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// A main function that runs boosting algorithm.
    fn run(&mut self) -> Self::Output {
        self.preprocess();

        let _ = (1..).try_for_each(|iter| self.boost(iter));

        self.postprocess()
    }


    /// Pre-processing for `self`.
    /// As you can see in [`Booster::run`],
    /// this method is called before the boosting process.
    fn preprocess(&mut self);


    /// Boosting step per iteration.
    /// This method returns
    /// `ControlFlow::Continue(())` if boosting should go on,
    /// `ControlFlow::Break(terminated_iter)` otherwise.
    fn boost(&mut self, iteration: usize) -> ControlFlow<usize>;


    /// Post-processing.
    fn postprocess(&mut self) -> Self::Output;
}
