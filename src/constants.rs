//! Default parameters shared by the boosters, the splitter and the front end.

/// Seed of the pseudo-random source used for tie-breaks and shuffles.
pub const DEFAULT_SEED:       u64 = 1234;

/// Maximum number of boosting rounds.
pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Margin `γ` of discrete boosting.
/// A rule is accepted only if its weighted error is below `0.5 - γ`.
pub const DEFAULT_GAMMA:      f64 = 0.01;

/// Number of folds of the internal cross validation.
pub const DEFAULT_N_FOLDS:    usize = 5;

/// Cumulative confidence an instance needs before BoostCAR stops
/// looking at it.
pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 1.0;

/// Weight below which experimental BoostCAR drops an instance.
pub const DEFAULT_WEIGHT_CUTOFF:      f64 = 0.1;

/// Slack used by the fold splitter when comparing accumulated weights.
pub const SPLIT_TOLERANCE:    f64 = 1e-7;

/// Confidence-rated boosting clamps the edge `z` to `1 - Z_SATURATION`.
pub const Z_SATURATION:       f64 = 1e-10;

/// Width of the numbers printed by the research tools.
pub const PRINT_WIDTH:        usize = 8;
