use std::collections::BTreeMap;
use std::rc::Rc;

use moongate_config::EngineConfig;
use moongate_events::EngineOutput;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use super::Script;
use super::script_runner::ScriptRunner;

/// Scripts addressable by name, launched fresh on every play
#[derive(Default, Clone)]
pub struct ScriptLibrary {
    scripts: BTreeMap<String, Rc<dyn Script>>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script, replacing any previous one with the same name
    pub fn register(&mut self, script: impl Script + 'static) {
        let name = script.name().to_string();
        debug!(target: "scripting", "Registering script: {}", name);
        self.scripts.insert(name, Rc::new(script));
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Script>> {
        self.scripts.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// Create a script runner from config and launch the profile's autostart scripts
pub fn create_runner_from_config(
    output_tx: UnboundedSender<EngineOutput>,
    config: &EngineConfig,
    library: ScriptLibrary,
) -> ScriptRunner {
    debug!(target: "scripting", "Creating script runner");
    let mut runner = ScriptRunner::new(output_tx, config.clone());
    runner.set_library(library);

    for name in config.autostart_for_profile() {
        if let Err(e) = runner.launch(&name) {
            error!(target: "scripting", "Failed to autostart {}: {}", name, e);
        }
    }

    runner
}
