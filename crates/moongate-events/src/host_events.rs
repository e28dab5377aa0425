use serde::{Deserialize, Serialize};

use crate::targeting::{CursorKind, TargetResult};
use crate::types::{ActionId, ControlId, GumpId, Serial, ServerGumpId, TargetSession};
use crate::world_objects::{ItemInfo, MobileInfo};

/// Mouse button reported with a control click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// How the host finished an action the engine issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Ok,
    Failed { reason: String },
}

impl ActionOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ActionOutcome::Ok)
    }
}

/// Everything the host client feeds into the engine between ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The player's own mobile changed (login, movement, equipment)
    PlayerUpdated { mobile: MobileInfo },
    ItemUpdated { item: ItemInfo },
    MobileUpdated { mobile: MobileInfo },
    /// An item or mobile left the client's view or was destroyed
    ObjectRemoved { serial: Serial },
    JournalLine {
        text: String,
        #[serde(default = "default_journal_source")]
        source: String,
    },
    /// The server opened a targeting cursor
    TargetCursorOpened {
        session: TargetSession,
        kind: CursorKind,
    },
    /// The server's cursor went away without a script answering it
    TargetCursorClosed { session: TargetSession },
    /// The player clicked with a cursor the engine armed
    TargetResult {
        session: TargetSession,
        result: TargetResult,
    },
    /// The player dismissed a cursor the engine armed
    TargetCanceled { session: TargetSession },
    ServerGumpOpened {
        gump: ServerGumpId,
        #[serde(default)]
        texts: Vec<String>,
    },
    ServerGumpClosed { gump: ServerGumpId },
    ControlClicked {
        gump: GumpId,
        control: ControlId,
        #[serde(default)]
        button: MouseButton,
    },
    /// A script gump was closed on the host side
    GumpClosed { gump: GumpId },
    ActionCompleted {
        action: ActionId,
        outcome: ActionOutcome,
    },
    /// The player is or stops dragging an item; relocations wait while set
    ItemHoldChanged { holding: bool },
}

fn default_journal_source() -> String {
    "system".to_string()
}

impl HostEvent {
    pub fn journal(text: impl Into<String>) -> Self {
        HostEvent::JournalLine {
            text: text.into(),
            source: default_journal_source(),
        }
    }

    pub fn completed(action: ActionId) -> Self {
        HostEvent::ActionCompleted {
            action,
            outcome: ActionOutcome::Ok,
        }
    }

    pub fn failed(action: ActionId, reason: impl Into<String>) -> Self {
        HostEvent::ActionCompleted {
            action,
            outcome: ActionOutcome::Failed {
                reason: reason.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;

    #[derive(Deserialize)]
    struct Feed {
        events: Vec<HostEvent>,
    }

    #[test]
    fn test_events_deserialize_from_toml() {
        let feed: Feed = toml::from_str(
            r#"
            [[events]]
            type = "journal_line"
            text = "You see: a dragon"

            [[events]]
            type = "target_result"
            session = 3
            result = { kind = "location", location = { x = 10, y = 20 } }
            "#,
        )
        .expect("feed should parse");

        assert_eq!(feed.events[0], HostEvent::journal("You see: a dragon"));
        assert_eq!(
            feed.events[1],
            HostEvent::TargetResult {
                session: TargetSession(3),
                result: TargetResult::Location {
                    location: Location::new(10, 20, 0),
                    graphic: None,
                },
            }
        );
    }
}
