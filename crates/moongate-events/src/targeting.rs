use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;

use crate::types::{Graphic, Location, Serial};

/// What a script expects the player to pick when it asks for a target.
///
/// The broker never filters on this; it is forwarded to the host so it can
/// shape the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    #[default]
    Any,
    Object,
    Location,
}

/// Flavor of a cursor opened by the server (spell, skill, item use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorKind {
    #[default]
    Neutral,
    Harmful,
    Beneficial,
}

/// Which server cursors a wait or query accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorFilter {
    #[default]
    Any,
    Neutral,
    Harmful,
    Beneficial,
}

impl CursorFilter {
    pub fn accepts(&self, kind: CursorKind) -> bool {
        match self {
            CursorFilter::Any => true,
            CursorFilter::Neutral => kind == CursorKind::Neutral,
            CursorFilter::Harmful => kind == CursorKind::Harmful,
            CursorFilter::Beneficial => kind == CursorKind::Beneficial,
        }
    }
}

impl FromStr for CursorFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" | "" => Ok(CursorFilter::Any),
            "neutral" => Ok(CursorFilter::Neutral),
            "harmful" | "harm" => Ok(CursorFilter::Harmful),
            "beneficial" | "ben" => Ok(CursorFilter::Beneficial),
            other => Err(format!("unknown target type '{}'", other)),
        }
    }
}

/// Raw result of one cursor click, exactly as the host delivered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetResult {
    Object {
        serial: Serial,
    },
    Location {
        location: Location,
        #[serde(default)]
        graphic: Option<Graphic>,
    },
}

impl TargetResult {
    pub fn serial(&self) -> Option<Serial> {
        match self {
            TargetResult::Object { serial } => Some(*serial),
            TargetResult::Location { .. } => None,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            TargetResult::Object { .. } => None,
            TargetResult::Location { location, .. } => Some(*location),
        }
    }
}

/// Answer a script gives to a cursor opened by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetChoice {
    Object {
        serial: Serial,
    },
    /// A land tile, or a static when `graphic` is set
    Location {
        location: Location,
        #[serde(default)]
        graphic: Option<Graphic>,
    },
}

impl From<Serial> for TargetChoice {
    fn from(serial: Serial) -> Self {
        TargetChoice::Object { serial }
    }
}

impl From<Location> for TargetChoice {
    fn from(location: Location) -> Self {
        TargetChoice::Location {
            location,
            graphic: None,
        }
    }
}
