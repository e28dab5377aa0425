use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to `<data dir>/logs/<component>.log`
    #[serde(default)]
    pub file: bool,
}
