use moongate_events::{
    EngineOutput, HostAction, HostCommand, HostEvent, ScriptEvent, ScriptEventType,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

/// Receives everything the engine emits, once per tick, in emission order
pub trait OutputConsumer {
    fn handle_output(&mut self, output: &EngineOutput);
}

/// Logs engine output to the console (for the CLI)
#[derive(Debug, Default)]
pub struct LoggingConsumer;

impl LoggingConsumer {
    fn log_script_event(event: &ScriptEvent) {
        match &event.event_type {
            ScriptEventType::Started => {
                info!(target: "events", "Script started: {} ({})", event.name, event.script);
            }
            ScriptEventType::Stopped => {
                info!(target: "events", "Script stopped: {} ({})", event.name, event.script);
            }
            ScriptEventType::Faulted { message } => {
                error!(target: "events", "Script faulted: {} ({}): {}", event.name, event.script, message);
            }
        }
    }

    fn log_action(command: &HostCommand) {
        let origin = command
            .origin
            .map(|id| id.to_string())
            .unwrap_or_else(|| "engine".to_string());

        match &command.action {
            HostAction::Say { channel, text } => {
                info!(target: "events", "[{}] says ({:?}): {}", origin, channel, text);
            }
            HostAction::SystemMessage { text, .. } => {
                info!(target: "events", "[{}] system: {}", origin, text);
            }
            HostAction::HeadMessage { serial, text, .. } => {
                info!(target: "events", "[{}] over {}: {}", origin, serial, text);
            }
            HostAction::ShowGump { gump, layout } => {
                info!(target: "events", "[{}] shows gump {:?} with {} control(s)", origin, gump, layout.controls.len());
            }
            other => {
                debug!(target: "events", "[{}] {:?} -> {:?}", origin, command.id, other);
            }
        }
    }
}

impl OutputConsumer for LoggingConsumer {
    fn handle_output(&mut self, output: &EngineOutput) {
        match output {
            EngineOutput::Script(event) => Self::log_script_event(event),
            EngineOutput::Action(command) => Self::log_action(command),
        }
    }
}

/// Stand-in host that reports every confirmable action as done
///
/// Replays have no real client behind them; without this, immediate moves
/// and gump replies would always run into their timeout.
pub struct ConfirmingHost {
    event_tx: UnboundedSender<HostEvent>,
}

impl ConfirmingHost {
    pub fn new(event_tx: UnboundedSender<HostEvent>) -> Self {
        Self { event_tx }
    }

    fn awaits_confirmation(action: &HostAction) -> bool {
        matches!(
            action,
            HostAction::MoveItem { .. }
                | HostAction::DoubleClick { .. }
                | HostAction::ReplyServerGump { .. }
        )
    }
}

impl OutputConsumer for ConfirmingHost {
    fn handle_output(&mut self, output: &EngineOutput) {
        let Some(command) = output.as_action() else {
            return;
        };
        if Self::awaits_confirmation(&command.action) {
            let _ = self.event_tx.send(HostEvent::completed(command.id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moongate_events::{ActionId, ScriptId, Serial};
    use tokio::sync::mpsc;

    fn command(action: HostAction) -> EngineOutput {
        EngineOutput::Action(HostCommand {
            id: ActionId(7),
            origin: Some(ScriptId(1)),
            action,
        })
    }

    #[test]
    fn test_confirming_host_answers_only_confirmable_actions() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut host = ConfirmingHost::new(tx);

        host.handle_output(&command(HostAction::Attack { serial: Serial(5) }));
        assert!(rx.try_recv().is_err());

        host.handle_output(&command(HostAction::DoubleClick { serial: Serial(5) }));
        assert_eq!(rx.try_recv().ok(), Some(HostEvent::completed(ActionId(7))));
    }
}
