pub mod apt;
pub mod experiment;
pub mod roll;

// Re-export commonly used items from apt module
pub use apt::{
    evaluate_martingale, evaluate_martingale_by_minute, evaluate_weighted_martingale,
    evaluate_weighted_martingale_by_minute, MartingaleEvaluation, MinuteBucket,
    MinuteMartingaleEvaluation, PriceSource,
};

// Re-export commonly used items from roll module
pub use roll::{estimate_roll_spread, RollAnalysis, RollEstimate, RollSummary};

// Re-export commonly used items from experiment module
pub use experiment::{ExperimentConfig, ExperimentReport, ExperimentRunner, RollOutcome};
