use std::path::PathBuf;

use thiserror::Error;

/// Ways a script body can end other than returning `Ok(())`
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script asked to stop itself
    #[error("script stopped")]
    Stopped,
    #[error("{0}")]
    Fault(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ScriptResult = Result<(), ScriptError>;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no script named '{0}' is registered")]
    UnknownScript(String),
    #[error("script '{0}' panicked while starting")]
    StartPanicked(String),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize persistent variables: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
