//! Asset pricing (martingale) hypothesis: the current price is the best
//! estimate of the next one.

pub mod martingale;

// Re-export commonly used items
pub use martingale::{
    bucket_by_minute, evaluate_martingale, evaluate_martingale_by_minute,
    evaluate_mid_price_martingale, evaluate_mid_price_martingale_by_minute,
    evaluate_weighted_martingale, evaluate_weighted_martingale_by_minute, price_transitions,
    BucketEvaluation, MartingaleEvaluation, MinuteBucket, MinuteMartingaleEvaluation,
    MinuteSummary, PriceSource, PriceTransition,
};
