//! Variables scripts share with each other and persist across sessions.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use moongate_config::ProfileIdentity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::PersistError;

/// Process-wide variables visible to every running script
#[derive(Debug, Default)]
pub struct SharedVars {
    values: HashMap<String, toml::Value>,
}

impl SharedVars {
    pub fn set(&mut self, name: impl Into<String>, value: toml::Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&toml::Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<toml::Value> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Who a persistent variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarScope {
    /// This character on this account and server
    Char,
    Account,
    Server,
    Global,
}

impl VarScope {
    /// Section name a scope is stored under
    fn section(self) -> &'static str {
        match self {
            VarScope::Char => "char",
            VarScope::Account => "account",
            VarScope::Server => "server",
            VarScope::Global => "global",
        }
    }
}

const GLOBAL_SCOPE_KEY: &str = "GLOBAL";

/// How long to wait before retrying a failed save
pub const FLUSH_RETRY: Duration = Duration::from_secs(5);

/// scope section -> scope key -> variable name -> value
type VarTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// String variables saved to a TOML file, keyed by the logged-in profile
pub struct PersistentVars {
    path: PathBuf,
    profile: ProfileIdentity,
    data: VarTable,
    dirty: bool,
    /// Set while saving fails; no retry before this
    retry_at: Option<Instant>,
}

impl PersistentVars {
    /// Load from `path`; a missing file starts empty
    pub fn load(path: impl Into<PathBuf>, profile: ProfileIdentity) -> Result<Self, PersistError> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| PersistError::Read {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&content).map_err(|source| PersistError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            VarTable::new()
        };

        Ok(Self {
            path,
            profile,
            data,
            dirty: false,
            retry_at: None,
        })
    }

    /// Start empty, saving to `path` on the next flush
    pub fn empty(path: impl Into<PathBuf>, profile: ProfileIdentity) -> Self {
        Self {
            path: path.into(),
            profile,
            data: VarTable::new(),
            dirty: false,
            retry_at: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn scope_key(&self, scope: VarScope) -> String {
        let p = &self.profile;
        match scope {
            VarScope::Char => format!("{}{}{}", p.server, p.account, p.character),
            VarScope::Account => format!("{}{}", p.server, p.account),
            VarScope::Server => p.server.clone(),
            VarScope::Global => GLOBAL_SCOPE_KEY.to_string(),
        }
    }

    pub fn get(&self, name: &str, scope: VarScope) -> Option<&str> {
        self.data
            .get(scope.section())?
            .get(&self.scope_key(scope))?
            .get(name)
            .map(String::as_str)
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>, scope: VarScope) {
        let key = self.scope_key(scope);
        self.data
            .entry(scope.section().to_string())
            .or_default()
            .entry(key)
            .or_default()
            .insert(name.to_string(), value.into());
        self.dirty = true;
    }

    pub fn remove(&mut self, name: &str, scope: VarScope) -> bool {
        let key = self.scope_key(scope);
        let removed = self
            .data
            .get_mut(scope.section())
            .and_then(|keys| keys.get_mut(&key))
            .and_then(|vars| vars.remove(name))
            .is_some();
        self.dirty |= removed;
        removed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes through a temp file renamed over the target
    pub fn flush(&mut self) -> Result<(), PersistError> {
        if !self.dirty {
            return Ok(());
        }

        let content = toml::to_string_pretty(&self.data)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let write_err = |source| PersistError::Write {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(write_err)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(target: "scripting", "Saved persistent variables to {}", self.path.display());
        self.dirty = false;
        Ok(())
    }

    /// Flush, logging instead of failing.
    ///
    /// After a failure further attempts wait [`FLUSH_RETRY`], and only the
    /// first failure and the eventual recovery are logged.
    pub fn flush_logged(&mut self, now: Instant) {
        if self.retry_at.is_some_and(|at| now < at) {
            return;
        }

        match self.flush() {
            Ok(()) => {
                if self.retry_at.take().is_some() {
                    info!(target: "scripting",
                        "Saved persistent variables to {} again",
                        self.path.display()
                    );
                }
            }
            Err(e) => {
                if self.retry_at.is_none() {
                    warn!(target: "scripting",
                        "Failed to save persistent variables, retrying every {:?}: {}",
                        FLUSH_RETRY,
                        e
                    );
                }
                self.retry_at = Some(now + FLUSH_RETRY);
            }
        }
    }

    pub fn is_failing(&self) -> bool {
        self.retry_at.is_some()
    }
}
