pub mod runner;

pub use runner::{
    ExperimentConfig, ExperimentReport, ExperimentRunner, MartingaleExperiment, RollOutcome,
};
