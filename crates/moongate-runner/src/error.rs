use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Scenario file not found: {0}")]
    ScenarioNotFound(PathBuf),
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Scenario event {index} is scheduled before the previous one")]
    OutOfOrder { index: usize },
}
