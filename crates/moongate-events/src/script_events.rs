use crate::types::ScriptId;

/// Types of script lifecycle events reported to the host's operator log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEventType {
    Started,
    Stopped,
    Faulted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEvent {
    pub script: ScriptId,
    pub name: String,
    pub event_type: ScriptEventType,
}

impl ScriptEvent {
    pub fn new(script: ScriptId, name: impl Into<String>, event_type: ScriptEventType) -> Self {
        Self {
            script,
            name: name.into(),
            event_type,
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self.event_type, ScriptEventType::Faulted { .. })
    }
}
