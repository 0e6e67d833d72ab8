//! The data model: mined itemsets, training sets and test instances.

/// Defines itemsets, patterns and supports.
pub mod itemset;
/// Defines test instances.
pub mod instance;
/// Defines the labeled training set.
pub mod training_set;
/// Defines the file readers.
pub mod reader;


pub use itemset::{
    Itemset,
    Pattern,
    Support,
    support_from,
};
pub use instance::Instance;
pub use training_set::TrainingSet;
pub use reader::{
    ItemsetReader,
    ItemsetFormat,
    ReadError,
};
