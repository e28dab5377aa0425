use moongate_events::{ActionId, EngineOutput, HostAction, HostCommand, ScriptEvent, ScriptId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Outgoing side of the engine: host actions and lifecycle reports
pub struct ActionSink {
    tx: UnboundedSender<EngineOutput>,
    next_id: u64,
}

impl ActionSink {
    pub fn new(tx: UnboundedSender<EngineOutput>) -> Self {
        Self { tx, next_id: 1 }
    }

    /// Send an action to the host, returning the id its completion will carry
    pub fn send(&mut self, origin: Option<ScriptId>, action: HostAction) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;

        debug!(target: "scripting", "Issuing {:?} from {:?}: {:?}", id, origin, action);
        let _ = self.tx.send(EngineOutput::Action(HostCommand { id, origin, action }));
        id
    }

    pub fn report(&self, event: ScriptEvent) {
        let _ = self.tx.send(EngineOutput::Script(event));
    }
}
