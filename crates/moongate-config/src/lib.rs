pub mod engine_config;
pub mod logging_config;
pub mod moongate_config;
pub mod paths;

pub use engine_config::{EngineConfig, ProfileIdentity};
pub use logging_config::LoggingConfig;
pub use moongate_config::{ConfigLoadError, MoongateConfig};
pub use paths::ProjectPaths;

/// Application name used for config, data and log directories
pub const APP_NAME: &str = "moongate";
