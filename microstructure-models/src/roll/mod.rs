pub mod spread_estimator;

// Re-export commonly used items
pub use spread_estimator::{
    estimate_roll_spread, price_change_autocovariance, roll_estimate, RollAnalysis,
    RollComparisonRow, RollEstimate, RollSummary, MIN_ROLL_PRICES,
};
