// Shared harness for driving a ScriptRunner with synthetic time

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use moongate_config::EngineConfig;
use moongate_events::{
    EngineOutput, HostAction, HostCommand, HostEvent, ItemInfo, Location, MobileInfo, Notoriety,
    ScriptEvent, ScriptId, Serial,
};
use moongate_scripting_host::{Script, ScriptRunner};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub const TICK: Duration = Duration::from_millis(50);
pub const PLAYER: Serial = Serial(0x0000_0001);
pub const BACKPACK: Serial = Serial(0x4000_0001);

/// Log scripts write to so tests can observe what they did
pub type Trace = Rc<RefCell<Vec<String>>>;

pub fn trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn record(trace: &Trace, entry: impl Into<String>) {
    trace.borrow_mut().push(entry.into());
}

pub struct Harness {
    pub runner: ScriptRunner,
    pub rx: UnboundedReceiver<EngineOutput>,
    pub now: Instant,
    _dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(mut config: EngineConfig) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        config.persistent_vars_path = Some(dir.path().join("persistent_vars.toml"));
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            runner: ScriptRunner::new(tx, config),
            rx,
            now: Instant::now(),
            _dir: dir,
        }
    }

    pub fn vars_path(&self) -> std::path::PathBuf {
        self._dir.path().join("persistent_vars.toml")
    }

    pub fn register(&mut self, script: impl Script + 'static) {
        self.runner.register(script);
    }

    pub fn launch(&mut self, name: &str) -> ScriptId {
        self.runner.launch(name).expect("script is registered")
    }

    pub fn send(&mut self, event: HostEvent) {
        self.runner.handle_event(event);
    }

    pub fn tick(&mut self) {
        self.now += TICK;
        self.runner.tick(self.now);
    }

    pub fn ticks(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Tick until `elapsed` of synthetic time has passed
    pub fn run_for(&mut self, elapsed: Duration) {
        let end = self.now + elapsed;
        while self.now < end {
            self.tick();
        }
    }

    pub fn outputs(&mut self) -> Vec<EngineOutput> {
        let mut out = Vec::new();
        while let Ok(output) = self.rx.try_recv() {
            out.push(output);
        }
        out
    }

    pub fn actions(&mut self) -> Vec<HostCommand> {
        self.outputs()
            .into_iter()
            .filter_map(|o| match o {
                EngineOutput::Action(command) => Some(command),
                EngineOutput::Script(_) => None,
            })
            .collect()
    }

    pub fn script_events(&mut self) -> Vec<ScriptEvent> {
        self.outputs()
            .into_iter()
            .filter_map(|o| match o {
                EngineOutput::Script(event) => Some(event),
                EngineOutput::Action(_) => None,
            })
            .collect()
    }

    /// Player standing at `x, y` with a backpack
    pub fn spawn_player(&mut self, x: u16, y: u16) {
        self.send(HostEvent::PlayerUpdated {
            mobile: mobile(PLAYER, x, y, Notoriety::Innocent),
        });
        self.send(HostEvent::ItemUpdated {
            item: ItemInfo {
                container: Some(PLAYER),
                ..item(BACKPACK, 0x0E75)
            },
        });
    }
}

pub fn mobile(serial: Serial, x: u16, y: u16, notoriety: Notoriety) -> MobileInfo {
    MobileInfo {
        serial,
        graphic: 0x0190,
        hue: 0,
        name: format!("mobile {}", serial),
        location: Location::new(x, y, 0),
        notoriety,
        is_dead: false,
        in_party: false,
        is_follower: false,
    }
}

pub fn item(serial: Serial, graphic: u16) -> ItemInfo {
    ItemInfo {
        serial,
        graphic,
        hue: 0,
        amount: 1,
        name: String::new(),
        container: None,
        location: Location::default(),
        layer: None,
        is_corpse: false,
    }
}

pub fn in_backpack(serial: Serial, graphic: u16) -> HostEvent {
    HostEvent::ItemUpdated {
        item: ItemInfo {
            container: Some(BACKPACK),
            ..item(serial, graphic)
        },
    }
}

pub fn moved_items(actions: &[HostCommand]) -> Vec<Serial> {
    actions
        .iter()
        .filter_map(|c| match c.action {
            HostAction::MoveItem { serial, .. } => Some(serial),
            _ => None,
        })
        .collect()
}
