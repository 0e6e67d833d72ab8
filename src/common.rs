//! Defines some common functions used in this library.

/// Defines some useful functions such as normalization and tie tracking.
pub mod utils;

/// Defines rule interestingness measures.
pub mod metrics;

/// Defines some checker functions.
pub(crate) mod checker;
