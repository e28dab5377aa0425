use serde::{Deserialize, Serialize};

use crate::gump_layout::GumpLayout;
use crate::script_events::ScriptEvent;
use crate::targeting::{TargetChoice, TargetKind};
use crate::types::{ActionId, GumpId, Hue, Location, ScriptId, Serial, ServerGumpId, TargetSession};

/// Channel a spoken message goes out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechChannel {
    Say,
    Party,
    Guild,
    Alliance,
    Whisper,
    Yell,
    Emote,
}

/// Where a relocated item should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveDestination {
    Container { serial: Serial },
    /// On the ground; `osi` selects the retail server's ground sentinel
    Ground { osi: bool },
}

/// A single request the engine asks the host to carry out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostAction {
    Attack {
        serial: Serial,
    },
    SingleClick {
        serial: Serial,
    },
    DoubleClick {
        serial: Serial,
    },
    Equip {
        serial: Serial,
    },
    ContextMenu {
        serial: Serial,
        entry: u16,
    },
    /// Pick up `amount` (0 = whole stack) and drop it at the destination
    MoveItem {
        serial: Serial,
        destination: MoveDestination,
        amount: u16,
        /// Drop position; `None` lets the host place or stack the item
        position: Option<Location>,
    },
    Say {
        channel: SpeechChannel,
        text: String,
    },
    HeadMessage {
        serial: Serial,
        text: String,
        hue: Option<Hue>,
    },
    SystemMessage {
        text: String,
        hue: Hue,
    },
    ArmTargetCursor {
        session: TargetSession,
        kind: TargetKind,
    },
    CancelTargetCursor {
        session: TargetSession,
    },
    SendTarget {
        session: TargetSession,
        choice: TargetChoice,
    },
    ShowGump {
        gump: GumpId,
        layout: GumpLayout,
    },
    CloseGump {
        gump: GumpId,
    },
    ReplyServerGump {
        gump: ServerGumpId,
        button: u32,
    },
    CloseServerGump {
        gump: ServerGumpId,
    },
    ShowCooldownBar {
        seconds: f64,
        text: String,
        hue: Hue,
    },
}

/// An action tagged with its id and the script that issued it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCommand {
    pub id: ActionId,
    pub origin: Option<ScriptId>,
    pub action: HostAction,
}

/// Everything the engine emits on its output channel
#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutput {
    Action(HostCommand),
    Script(ScriptEvent),
}

impl EngineOutput {
    pub fn as_action(&self) -> Option<&HostCommand> {
        match self {
            EngineOutput::Action(cmd) => Some(cmd),
            EngineOutput::Script(_) => None,
        }
    }

    pub fn as_script_event(&self) -> Option<&ScriptEvent> {
        match self {
            EngineOutput::Action(_) => None,
            EngineOutput::Script(event) => Some(event),
        }
    }
}
