//! Scripts bundled with the CLI so a scenario has something to drive

mod button_panel;
mod fish_mover;
mod guard_caller;

pub use button_panel::ButtonPanelScript;
pub use fish_mover::{FISH_GRAPHICS, FishMoverScript};
pub use guard_caller::GuardCallerScript;

use moongate_scripting_host::ScriptLibrary;

/// Every bundled script, ready to hand to the driver
pub fn demo_library() -> ScriptLibrary {
    let mut library = ScriptLibrary::new();
    library.register(GuardCallerScript);
    library.register(FishMoverScript);
    library.register(ButtonPanelScript);
    library
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::{Duration, Instant};

    use moongate_config::EngineConfig;
    use moongate_events::{
        EngineOutput, HostAction, HostEvent, ItemInfo, Layer, Location, MobileInfo, Notoriety,
        Serial,
    };
    use moongate_scripting_host::ScriptRunner;
    use tempfile::TempDir;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    const TICK: Duration = Duration::from_millis(50);
    pub const PLAYER: Serial = Serial(0x0000_0001);
    pub const BACKPACK: Serial = Serial(0x4000_0001);

    /// Runner fed by hand with synthetic time
    pub struct TestHost {
        pub runner: ScriptRunner,
        rx: UnboundedReceiver<EngineOutput>,
        now: Instant,
        _dir: TempDir,
    }

    impl TestHost {
        pub fn new() -> Self {
            Self::with_config(EngineConfig::default())
        }

        /// `settings` is the TOML body of the script's `[script_config.<name>]` table
        pub fn with_script_config(script: &str, settings: &str) -> Self {
            let mut config = EngineConfig::default();
            let value: toml::Value = toml::from_str(settings).unwrap();
            config.script_config.insert(script.to_string(), value);
            Self::with_config(config)
        }

        fn with_config(mut config: EngineConfig) -> Self {
            let dir = tempfile::tempdir().unwrap();
            config.persistent_vars_path = Some(dir.path().join("vars.toml"));
            let (tx, rx) = mpsc::unbounded_channel();
            Self {
                runner: ScriptRunner::new(tx, config),
                rx,
                now: Instant::now(),
                _dir: dir,
            }
        }

        pub fn send(&mut self, event: HostEvent) {
            self.runner.handle_event(event);
        }

        pub fn run_for(&mut self, elapsed: Duration) {
            let end = self.now + elapsed;
            while self.now < end {
                self.now += TICK;
                self.runner.tick(self.now);
            }
        }

        /// Actions sent since the last call
        pub fn actions(&mut self) -> Vec<HostAction> {
            let mut actions = Vec::new();
            while let Ok(output) = self.rx.try_recv() {
                if let EngineOutput::Action(command) = output {
                    actions.push(command.action);
                }
            }
            actions
        }

        /// Player at 100, 100 wearing a backpack
        pub fn spawn_player(&mut self) {
            self.send(HostEvent::PlayerUpdated {
                mobile: MobileInfo {
                    name: "player".to_string(),
                    notoriety: Notoriety::Innocent,
                    ..mobile(PLAYER, 0)
                },
            });
            self.send(HostEvent::ItemUpdated {
                item: ItemInfo {
                    container: Some(PLAYER),
                    layer: Some(Layer::Backpack),
                    ..item(BACKPACK, 0x0E75)
                },
            });
        }
    }

    fn mobile(serial: Serial, dx: u16) -> MobileInfo {
        MobileInfo {
            serial,
            graphic: 0x0190,
            hue: 0,
            name: String::new(),
            location: Location::new(100 + dx, 100, 0),
            notoriety: Notoriety::Unknown,
            is_dead: false,
            in_party: false,
            is_follower: false,
        }
    }

    fn item(serial: Serial, graphic: u16) -> ItemInfo {
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

    /// A murderous troll `distance` tiles east of the player
    pub fn hostile(serial: Serial, distance: u16) -> HostEvent {
        HostEvent::MobileUpdated {
            mobile: MobileInfo {
                name: "a troll".to_string(),
                notoriety: Notoriety::Murderer,
                ..mobile(serial, distance)
            },
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

    #[test]
    fn test_library_has_every_demo() {
        let library = super::demo_library();
        let mut names: Vec<_> = library.names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["button_panel", "fish_mover", "guard_caller"]);
    }

    /// Everything a replay said or showed, in order
    #[derive(Clone, Default)]
    struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<HostAction>>>);

    impl moongate_runner::OutputConsumer for Recorder {
        fn handle_output(&mut self, output: &EngineOutput) {
            if let Some(command) = output.as_action() {
                self.0.borrow_mut().push(command.action.clone());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bundled_scenario_replays() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            persistent_vars_path: Some(dir.path().join("vars.toml")),
            ..EngineConfig::default()
        };
        let scenario =
            moongate_runner::Scenario::parse(include_str!("../../../../scenarios/demo.toml"))
                .unwrap();
        let recorder = Recorder::default();

        let report = moongate_runner::run_scenario(
            &config,
            super::demo_library(),
            scenario,
            vec![Box::new(recorder.clone())],
            true,
        )
        .await;
        // Scenario events plus the confirmations for each move
        assert!(report.events >= 10);

        let actions = recorder.0.borrow();
        let moved = actions
            .iter()
            .filter(|a| matches!(a, HostAction::MoveItem { .. }))
            .count();
        assert_eq!(moved, 2);
        assert!(actions.iter().any(|a| matches!(
            a,
            HostAction::HeadMessage { serial: Serial(1280), text, .. } if text == "a troll"
        )));
        assert!(actions.iter().any(|a| matches!(a, HostAction::CloseGump { .. })));
    }
}
