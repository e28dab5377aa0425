use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::{APP_NAME, paths::ProjectPaths};

/// Who is logged in; keys persistent variables and character autostart lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileIdentity {
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub character: String,
}

impl ProfileIdentity {
    /// Key under which per-character autostart lists are stored
    pub fn character_key(&self) -> String {
        format!("{}{}", self.account, self.character)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Driver tick period in milliseconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Minimum gap between two relocations sent to the host, shared by all scripts
    #[serde(default = "default_move_pacing")]
    pub move_pacing_ms: u64,

    /// How long an immediate action waits for host confirmation
    #[serde(default = "default_action_timeout")]
    pub action_timeout_ms: u64,

    #[serde(default = "default_max_pause")]
    pub max_pause_secs: f64,

    /// Pending callbacks held per script before the oldest is dropped
    #[serde(default = "default_callback_limit")]
    pub callback_limit: usize,

    #[serde(default = "default_journal_capacity")]
    pub journal_capacity: usize,

    /// Scripts launched for every character
    #[serde(default)]
    pub autostart: Vec<String>,

    #[serde(default)]
    pub profile: ProfileIdentity,

    /// Scripts launched only for one character, keyed by `ProfileIdentity::character_key`
    #[serde(default)]
    pub character_autostart: HashMap<String, Vec<String>>,

    /// Per-script configuration (script name -> config values)
    #[serde(default)]
    pub script_config: HashMap<String, toml::Value>,

    /// Persistent variable store (default: <data dir>/persistent_vars.toml)
    #[serde(default)]
    pub persistent_vars_path: Option<PathBuf>,
}

fn default_tick_interval() -> u64 {
    50
}

fn default_move_pacing() -> u64 {
    1000
}

fn default_action_timeout() -> u64 {
    5000
}

fn default_max_pause() -> f64 {
    2000.0
}

fn default_callback_limit() -> usize {
    100
}

fn default_journal_capacity() -> usize {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            move_pacing_ms: default_move_pacing(),
            action_timeout_ms: default_action_timeout(),
            max_pause_secs: default_max_pause(),
            callback_limit: default_callback_limit(),
            journal_capacity: default_journal_capacity(),
            autostart: Vec::new(),
            profile: ProfileIdentity::default(),
            character_autostart: HashMap::new(),
            script_config: HashMap::new(),
            persistent_vars_path: None,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn move_pacing(&self) -> Duration {
        Duration::from_millis(self.move_pacing_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Scripts to launch at engine start: global list first, then this character's
    pub fn autostart_for_profile(&self) -> Vec<String> {
        let mut names = self.autostart.clone();
        if let Some(extra) = self.character_autostart.get(&self.profile.character_key()) {
            for name in extra {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Get the persistent variable store path (use provided or default)
    pub fn persistent_vars_path(&self) -> PathBuf {
        self.persistent_vars_path.clone().unwrap_or_else(|| {
            ProjectPaths::new(APP_NAME)
                .map(|p| p.persistent_vars_file())
                .unwrap_or_else(|| PathBuf::from("persistent_vars.toml"))
        })
    }
}
