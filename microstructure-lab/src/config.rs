use microstructure_data::DEFAULT_EXCHANGE;
use std::path::PathBuf;

/// Order book dump analysed when no input is given
pub const DEFAULT_INPUT: &str = "files/orderbooks_05jul21.json";

/// Analysis run configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub exchange: String,
    /// Where to write the JSON report, if anywhere
    pub output_path: Option<PathBuf>,
    pub roll_enabled: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            exchange: DEFAULT_EXCHANGE.to_string(),
            output_path: None,
            roll_enabled: true,
        }
    }
}
