//! Snapshots of world objects as the host reports them.
//!
//! The engine treats these as opaque value types: it stores the latest
//! snapshot per serial and filters them for scans, nothing more.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;

use crate::types::{Graphic, Hue, Location, Serial};

/// Hostility / allegiance classification of a mobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Notoriety {
    #[default]
    Unknown = 0x00,
    Innocent = 0x01,
    Ally = 0x02,
    Gray = 0x03,
    Criminal = 0x04,
    Enemy = 0x05,
    Murderer = 0x06,
    Invulnerable = 0x07,
}

bitflags! {
    /// Set of notorieties a mobile scan accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct NotorietyFilter: u8 {
        const UNKNOWN = 1 << 0;
        const INNOCENT = 1 << 1;
        const ALLY = 1 << 2;
        const GRAY = 1 << 3;
        const CRIMINAL = 1 << 4;
        const ENEMY = 1 << 5;
        const MURDERER = 1 << 6;
        const INVULNERABLE = 1 << 7;

        const HOSTILE = Self::GRAY.bits() | Self::CRIMINAL.bits() | Self::ENEMY.bits() | Self::MURDERER.bits();
    }
}

impl NotorietyFilter {
    pub fn accepts(&self, notoriety: Notoriety) -> bool {
        self.contains(NotorietyFilter::from(notoriety))
    }
}

impl From<Notoriety> for NotorietyFilter {
    fn from(value: Notoriety) -> Self {
        NotorietyFilter::from_bits_truncate(1 << (value as u8))
    }
}

impl FromIterator<Notoriety> for NotorietyFilter {
    fn from_iter<T: IntoIterator<Item = Notoriety>>(iter: T) -> Self {
        iter.into_iter()
            .fold(NotorietyFilter::empty(), |acc, n| acc | NotorietyFilter::from(n))
    }
}

/// Equipment layer an item occupies on a mobile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Layer {
    OneHanded,
    TwoHanded,
    Shoes,
    Pants,
    Shirt,
    Helmet,
    Gloves,
    Ring,
    Talisman,
    Necklace,
    Hair,
    Waist,
    Torso,
    Bracelet,
    Face,
    Beard,
    Tunic,
    Earrings,
    Arms,
    Cloak,
    Backpack,
    Robe,
    Skirt,
    Legs,
    Mount,
    Bank,
}

/// Error returned when a layer name is not recognised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayer(pub String);

impl std::fmt::Display for UnknownLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown layer '{}'", self.0)
    }
}

impl std::error::Error for UnknownLayer {}

impl FromStr for Layer {
    type Err = UnknownLayer;

    /// Accepts the names scripts use, ignoring case, spaces and underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        let layer = match key.as_str() {
            "onehanded" | "lefthand" => Layer::OneHanded,
            "twohanded" | "righthand" => Layer::TwoHanded,
            "shoes" => Layer::Shoes,
            "pants" => Layer::Pants,
            "shirt" => Layer::Shirt,
            "helmet" | "head" => Layer::Helmet,
            "gloves" => Layer::Gloves,
            "ring" => Layer::Ring,
            "talisman" => Layer::Talisman,
            "necklace" => Layer::Necklace,
            "hair" => Layer::Hair,
            "waist" => Layer::Waist,
            "torso" => Layer::Torso,
            "bracelet" => Layer::Bracelet,
            "face" => Layer::Face,
            "beard" => Layer::Beard,
            "tunic" => Layer::Tunic,
            "earrings" => Layer::Earrings,
            "arms" => Layer::Arms,
            "cloak" => Layer::Cloak,
            "backpack" => Layer::Backpack,
            "robe" => Layer::Robe,
            "skirt" => Layer::Skirt,
            "legs" => Layer::Legs,
            "mount" => Layer::Mount,
            "bank" => Layer::Bank,
            _ => return Err(UnknownLayer(s.to_string())),
        };

        Ok(layer)
    }
}

/// Latest known state of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub serial: Serial,
    pub graphic: Graphic,
    #[serde(default)]
    pub hue: Hue,
    #[serde(default = "default_amount")]
    pub amount: u16,
    #[serde(default)]
    pub name: String,
    /// Parent container or wearer; `None` when lying on the ground
    #[serde(default)]
    pub container: Option<Serial>,
    /// World position when on the ground, position inside the container otherwise
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub layer: Option<Layer>,
    #[serde(default)]
    pub is_corpse: bool,
}

fn default_amount() -> u16 {
    1
}

/// Latest known state of a mobile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobileInfo {
    pub serial: Serial,
    pub graphic: Graphic,
    #[serde(default)]
    pub hue: Hue,
    #[serde(default)]
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub notoriety: Notoriety,
    #[serde(default)]
    pub is_dead: bool,
    #[serde(default)]
    pub in_party: bool,
    #[serde(default)]
    pub is_follower: bool,
}

/// Category of entity a nearest-entity scan looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanType {
    Hostile,
    Party,
    Followers,
    Objects,
    Mobiles,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_parsing_is_lenient() {
        assert_eq!("Helmet".parse::<Layer>(), Ok(Layer::Helmet));
        assert_eq!("one_handed".parse::<Layer>(), Ok(Layer::OneHanded));
        assert_eq!("Two Handed".parse::<Layer>(), Ok(Layer::TwoHanded));
        assert!("wings".parse::<Layer>().is_err());
    }

    #[test]
    fn test_notoriety_filter_from_list() {
        let filter: NotorietyFilter = [Notoriety::Gray, Notoriety::Criminal].into_iter().collect();
        assert!(filter.accepts(Notoriety::Gray));
        assert!(filter.accepts(Notoriety::Criminal));
        assert!(!filter.accepts(Notoriety::Innocent));
        assert!(NotorietyFilter::HOSTILE.accepts(Notoriety::Murderer));
    }
}
