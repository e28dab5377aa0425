/// Event and action types shared between the moongate engine and its host
///
/// This crate carries no behavior beyond small helpers; the host client feeds
/// `HostEvent`s in, and the engine answers with `EngineOutput`s.
pub mod gump_layout;
pub mod host_actions;
pub mod host_events;
pub mod script_events;
pub mod targeting;
pub mod types;
pub mod world_objects;

pub use gump_layout::{ControlKind, ControlNode, GumpConfig, GumpLayout, Rect};
pub use host_actions::{EngineOutput, HostAction, HostCommand, MoveDestination, SpeechChannel};
pub use host_events::{ActionOutcome, HostEvent, MouseButton};
pub use script_events::{ScriptEvent, ScriptEventType};
pub use targeting::{CursorFilter, CursorKind, TargetChoice, TargetKind, TargetResult};
pub use types::{
    ActionId, ControlId, Graphic, GumpId, Hue, Location, ScriptId, Serial, ServerGumpId,
    TargetSession,
};
pub use world_objects::{
    ItemInfo, Layer, MobileInfo, Notoriety, NotorietyFilter, ScanType, UnknownLayer,
};
