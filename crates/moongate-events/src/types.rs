use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of an in-world item or mobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(pub u32);

impl Serial {
    /// Serial the host uses for "no object"
    pub const NONE: Serial = Serial(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0 && self.0 != u32::MAX
    }
}

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl From<u32> for Serial {
    fn from(value: u32) -> Self {
        Serial(value)
    }
}

/// Art id of an item, mobile body or static tile
pub type Graphic = u16;

/// Color index used for text and item tinting
pub type Hue = u16;

/// A position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: u16,
    pub y: u16,
    #[serde(default)]
    pub z: i16,
}

impl Location {
    pub fn new(x: u16, y: u16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Tile distance as the client measures it: the larger axis delta
    pub fn distance_to(&self, other: &Location) -> u32 {
        let dx = (self.x as i32 - other.x as i32).unsigned_abs();
        let dy = (self.y as i32 - other.y as i32).unsigned_abs();
        dx.max(dy)
    }

    /// Location shifted by a relative offset, saturating at the map edges
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Location {
        Location {
            x: (self.x as i32 + dx).clamp(0, u16::MAX as i32) as u16,
            y: (self.y as i32 + dy).clamp(0, u16::MAX as i32) as u16,
            z: (self.z as i32 + dz).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        }
    }
}

/// Identity of a running script, unique for the lifetime of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(pub u64);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "script#{}", self.0)
    }
}

/// Identifier attached to every action the engine issues to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

/// Identifier of a gump built by a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GumpId(pub u32);

/// Identifier of a control inside a script gump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(pub u32);

/// Identifier of a gump opened by the game server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerGumpId(pub u32);

/// One arming of the live targeting cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSession(pub u32);
