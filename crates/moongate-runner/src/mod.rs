mod driver;
mod error;
pub mod logging;
mod output_consumer;
pub mod replay;

pub use driver::{DriverReport, EngineDriver};
pub use error::DriverError;
pub use output_consumer::{ConfirmingHost, LoggingConsumer, OutputConsumer};
pub use replay::{Scenario, ScenarioEvent, replay};

use moongate_config::EngineConfig;
use moongate_scripting_host::ScriptLibrary;
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Replay `scenario` against a fresh engine built from `config` and `library`.
///
/// The scenario's scripts are launched before the first tick; unknown names
/// are logged and skipped.
pub async fn run_scenario(
    config: &EngineConfig,
    library: ScriptLibrary,
    scenario: Scenario,
    consumers: Vec<Box<dyn OutputConsumer>>,
    confirm_actions: bool,
) -> DriverReport {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut driver = EngineDriver::new(config, library);
    for consumer in consumers {
        driver = driver.with_boxed_consumer(consumer);
    }
    if confirm_actions {
        driver = driver.with_consumer(ConfirmingHost::new(event_tx.clone()));
    }
    for name in &scenario.scripts {
        if let Err(e) = driver.runner_mut().launch(name) {
            error!(target: "scripting", "Failed to launch {}: {}", name, e);
        }
    }

    let (report, _) = tokio::join!(
        driver.run(event_rx, Some(shutdown_rx)),
        replay(scenario, event_tx, shutdown_tx)
    );
    report
}
