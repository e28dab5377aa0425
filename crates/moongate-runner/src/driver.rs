use std::time::Duration;

use moongate_config::EngineConfig;
use moongate_events::{EngineOutput, HostEvent};
use moongate_scripting_host::{ScriptLibrary, ScriptRunner, create_runner_from_config};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::output_consumer::OutputConsumer;

/// Counters collected over one driver run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriverReport {
    pub ticks: u64,
    pub events: u64,
    pub outputs: u64,
}

/// Binds a host event channel to the scheduler tick.
///
/// The runner is not `Send`; run the driver on a current-thread runtime or
/// inside a `LocalSet`.
pub struct EngineDriver {
    runner: ScriptRunner,
    output_rx: mpsc::UnboundedReceiver<EngineOutput>,
    consumers: Vec<Box<dyn OutputConsumer>>,
    tick_interval: Duration,
    report: DriverReport,
}

impl EngineDriver {
    /// Build the scheduler from `config`, launching its autostart scripts
    pub fn new(config: &EngineConfig, library: ScriptLibrary) -> Self {
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let runner = create_runner_from_config(output_tx, config, library);

        Self {
            runner,
            output_rx,
            consumers: Vec::new(),
            tick_interval: config.tick_interval(),
            report: DriverReport::default(),
        }
    }

    pub fn with_consumer(self, consumer: impl OutputConsumer + 'static) -> Self {
        self.with_boxed_consumer(Box::new(consumer))
    }

    pub fn with_boxed_consumer(mut self, consumer: Box<dyn OutputConsumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    pub fn runner(&self) -> &ScriptRunner {
        &self.runner
    }

    /// Direct access for launching or stopping scripts before `run`
    pub fn runner_mut(&mut self) -> &mut ScriptRunner {
        &mut self.runner
    }

    /// Tick until shutdown is signalled or the host drops its event sender.
    ///
    /// Without a shutdown receiver, Ctrl+C stops the loop.
    pub async fn run(
        mut self,
        mut event_rx: mpsc::UnboundedReceiver<HostEvent>,
        mut shutdown_rx: Option<watch::Receiver<bool>>,
    ) -> DriverReport {
        info!(target: "scripting", "Driver started, ticking every {:?}", self.tick_interval);

        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                now = interval.tick() => {
                    self.runner.tick(now.into_std());
                    self.report.ticks += 1;
                    self.dispatch_outputs();
                }
                event = event_rx.recv() => match event {
                    Some(event) => {
                        self.runner.handle_event(event);
                        self.report.events += 1;
                    }
                    None => {
                        info!(target: "scripting", "Host event channel closed");
                        break;
                    }
                },
                _ = async {
                    if let Some(ref mut rx) = shutdown_rx {
                        rx.changed().await
                    } else {
                        std::future::pending().await
                    }
                } => {
                    info!(target: "scripting", "Driver received shutdown signal");
                    break;
                }
                _ = tokio::signal::ctrl_c(), if shutdown_rx.is_none() => {
                    info!(target: "scripting", "Received Ctrl+C, shutting down gracefully...");
                    break;
                }
            }
        }

        self.runner.shutdown();
        self.dispatch_outputs();

        info!(target: "scripting",
            "Driver stopped after {} tick(s), {} event(s), {} output(s)",
            self.report.ticks,
            self.report.events,
            self.report.outputs
        );
        self.report
    }

    fn dispatch_outputs(&mut self) {
        while let Ok(output) = self.output_rx.try_recv() {
            self.report.outputs += 1;
            for consumer in &mut self.consumers {
                consumer.handle_output(&output);
            }
        }
    }
}
