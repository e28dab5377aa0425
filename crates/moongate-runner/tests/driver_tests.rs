use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use moongate_config::EngineConfig;
use moongate_events::{EngineOutput, HostAction, HostEvent, ScriptEventType, SpeechChannel};
use moongate_runner::{EngineDriver, OutputConsumer, Scenario, run_scenario};
use moongate_scripting_host::{ScriptLibrary, script_fn};
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Keeps every output for the test to inspect
#[derive(Clone, Default)]
struct Collector(Rc<RefCell<Vec<EngineOutput>>>);

impl OutputConsumer for Collector {
    fn handle_output(&mut self, output: &EngineOutput) {
        self.0.borrow_mut().push(output.clone());
    }
}

impl Collector {
    fn said(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|o| match o.as_action().map(|c| &c.action) {
                Some(HostAction::Say { text, .. }) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn script_events(&self) -> Vec<(String, ScriptEventType)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|o| o.as_script_event())
            .map(|e| (e.name.clone(), e.event_type.clone()))
            .collect()
    }
}

fn test_config(dir: &TempDir) -> EngineConfig {
    EngineConfig {
        persistent_vars_path: Some(dir.path().join("vars.toml")),
        action_timeout_ms: 500,
        ..EngineConfig::default()
    }
}

fn library() -> ScriptLibrary {
    let mut library = ScriptLibrary::new();
    library.register(script_fn("greeter", |api| async move {
        if api.wait_for_journal(&["Welcome"], Duration::from_secs(5)).await {
            api.msg("hi");
        }
        Ok(())
    }));
    library.register(script_fn("user", |api| async move {
        api.pause(Duration::from_millis(100)).await;
        let used = api.use_object(moongate_events::Serial(0x4000_0010)).await;
        api.msg(format!("used {}", used));
        Ok(())
    }));
    library
}

const WELCOME: &str = r#"
scripts = ["greeter"]

[[events]]
at_ms = 200
event = { type = "journal_line", text = "Welcome to the shard" }
"#;

const USE_ITEM: &str = r#"
scripts = ["user"]
run_for_ms = 2000

[[events]]
at_ms = 0
event = { type = "item_updated", item = { serial = 1073741840, graphic = 3701 } }
"#;

#[tokio::test(start_paused = true)]
async fn test_scenario_events_reach_waiting_script() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::default();

    let report = run_scenario(
        &test_config(&dir),
        library(),
        Scenario::parse(WELCOME).unwrap(),
        vec![Box::new(collector.clone())],
        false,
    )
    .await;

    assert_eq!(collector.said(), vec!["hi".to_string()]);
    assert_eq!(
        collector.script_events(),
        vec![
            ("greeter".to_string(), ScriptEventType::Started),
            ("greeter".to_string(), ScriptEventType::Stopped),
        ]
    );
    assert_eq!(report.events, 1);
    assert!(report.ticks >= 20, "only {} ticks in 1.2s", report.ticks);
}

#[tokio::test(start_paused = true)]
async fn test_confirming_host_completes_actions() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::default();

    run_scenario(
        &test_config(&dir),
        library(),
        Scenario::parse(USE_ITEM).unwrap(),
        vec![Box::new(collector.clone())],
        true,
    )
    .await;

    assert_eq!(collector.said(), vec!["used true".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_action_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::default();

    run_scenario(
        &test_config(&dir),
        library(),
        Scenario::parse(USE_ITEM).unwrap(),
        vec![Box::new(collector.clone())],
        false,
    )
    .await;

    assert_eq!(collector.said(), vec!["used false".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_driver_stops_when_host_goes_away() {
    let dir = tempfile::tempdir().unwrap();
    let collector = Collector::default();
    let mut config = test_config(&dir);
    config.autostart = vec!["greeter".to_string()];

    let driver = EngineDriver::new(&config, library()).with_consumer(collector.clone());
    assert!(driver.runner().is_running("greeter"));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    event_tx.send(HostEvent::journal("Welcome back")).unwrap();
    drop(event_tx);

    let report = driver.run(event_rx, None).await;

    assert_eq!(report.events, 1);
    // Stopped by shutdown even if it never got to run again
    assert_eq!(
        collector.script_events().last(),
        Some(&("greeter".to_string(), ScriptEventType::Stopped))
    );
}

#[tokio::test(start_paused = true)]
async fn test_scenario_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("welcome.toml");
    std::fs::write(&path, WELCOME).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    let collector = Collector::default();
    run_scenario(
        &test_config(&dir),
        library(),
        scenario,
        vec![Box::new(collector.clone())],
        false,
    )
    .await;

    let says: Vec<_> = collector
        .0
        .borrow()
        .iter()
        .filter_map(|o| match o.as_action().map(|c| &c.action) {
            Some(HostAction::Say { channel, text }) => Some((*channel, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(says, vec![(SpeechChannel::Say, "hi".to_string())]);
}
