//! Provides some boosting algorithms over association rules.

mod core;

// ------------------------------------------------
// Baselines
mod lac;
mod zero;

// ------------------------------------------------
// Weight-updating boosting
mod discrete_boost;
mod confidence_boost;
mod slipper;

// ------------------------------------------------
// Greedy coverage
mod boostcar;


/// Booster trait
pub use self::core::Booster;

pub use self::lac::Lac;
pub use self::zero::Zero;

pub use self::discrete_boost::DiscreteBoost;
pub use self::confidence_boost::{ConfidenceBoost, ConfidenceRule};
pub use self::slipper::Slipper;

pub use self::boostcar::{BoostCar, ExperimentalBoostCar};
