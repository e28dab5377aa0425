use std::collections::HashMap;

use moongate_events::{
    Graphic, HostEvent, Hue, ItemInfo, Layer, Location, MobileInfo, NotorietyFilter, ScanType,
    Serial,
};

use crate::ignore::IgnoreSet;

/// Item search parameters; unset fields match anything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub graphic: Graphic,
    /// Only items directly inside this container
    pub container: Option<Serial>,
    /// Only ground items within this many tiles of the player
    pub range: Option<u32>,
    pub hue: Option<Hue>,
    pub min_amount: u16,
}

impl ItemQuery {
    pub fn graphic(graphic: Graphic) -> Self {
        Self {
            graphic,
            ..Self::default()
        }
    }

    pub fn in_container(mut self, container: Serial) -> Self {
        self.container = Some(container);
        self
    }

    pub fn within(mut self, range: u32) -> Self {
        self.range = Some(range);
        self
    }

    pub fn hue(mut self, hue: Hue) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn min_amount(mut self, amount: u16) -> Self {
        self.min_amount = amount;
        self
    }
}

/// The engine's copy of what the host has told it about the world
#[derive(Debug, Clone, Default)]
pub struct WorldView {
    player: Option<MobileInfo>,
    items: HashMap<Serial, ItemInfo>,
    mobiles: HashMap<Serial, MobileInfo>,
    item_hold: bool,
}

impl WorldView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a world event into the view; other events are ignored
    pub fn apply(&mut self, event: &HostEvent) {
        match event {
            HostEvent::PlayerUpdated { mobile } => {
                self.mobiles.insert(mobile.serial, mobile.clone());
                self.player = Some(mobile.clone());
            }
            HostEvent::ItemUpdated { item } => {
                self.items.insert(item.serial, item.clone());
            }
            HostEvent::MobileUpdated { mobile } => {
                if self.player.as_ref().is_some_and(|p| p.serial == mobile.serial) {
                    self.player = Some(mobile.clone());
                }
                self.mobiles.insert(mobile.serial, mobile.clone());
            }
            HostEvent::ObjectRemoved { serial } => {
                self.items.remove(serial);
                self.mobiles.remove(serial);
            }
            HostEvent::ItemHoldChanged { holding } => {
                self.item_hold = *holding;
            }
            _ => {}
        }
    }

    pub fn player(&self) -> Option<&MobileInfo> {
        self.player.as_ref()
    }

    pub fn item(&self, serial: Serial) -> Option<&ItemInfo> {
        self.items.get(&serial)
    }

    pub fn mobile(&self, serial: Serial) -> Option<&MobileInfo> {
        self.mobiles.get(&serial)
    }

    pub fn exists(&self, serial: Serial) -> bool {
        self.items.contains_key(&serial) || self.mobiles.contains_key(&serial)
    }

    /// Whether the player is dragging an item; relocations wait until released
    pub fn item_hold(&self) -> bool {
        self.item_hold
    }

    fn player_location(&self) -> Option<Location> {
        self.player.as_ref().map(|p| p.location)
    }

    fn distance(&self, location: &Location) -> Option<u32> {
        self.player_location().map(|p| p.distance_to(location))
    }

    fn sorted<'a, T: 'a>(iter: impl Iterator<Item = &'a T>, key: impl Fn(&T) -> Serial) -> Vec<&'a T> {
        let mut out: Vec<&T> = iter.collect();
        out.sort_by_key(|v| key(v));
        out
    }

    pub fn find_type_all(&self, query: &ItemQuery, ignore: &IgnoreSet) -> Vec<ItemInfo> {
        let candidates = self.items.values().filter(|item| {
            item.graphic == query.graphic
                && !ignore.contains(item.serial)
                && item.amount >= query.min_amount
                && query.hue.is_none_or(|h| item.hue == h)
                && query.container.is_none_or(|c| item.container == Some(c))
                && match (query.range, item.container) {
                    (Some(range), None) => self.distance(&item.location).is_some_and(|d| d <= range),
                    _ => true,
                }
        });

        Self::sorted(candidates, |i| i.serial)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn find_type(&self, query: &ItemQuery, ignore: &IgnoreSet) -> Option<ItemInfo> {
        self.find_type_all(query, ignore).into_iter().next()
    }

    /// Item worn on `layer` by `mobile`, or by the player when `None`
    pub fn find_layer(&self, layer: Layer, mobile: Option<Serial>) -> Option<ItemInfo> {
        let owner = mobile.or_else(|| self.player.as_ref().map(|p| p.serial))?;
        self.mobiles.get(&owner)?;

        self.items
            .values()
            .find(|i| i.container == Some(owner) && i.layer == Some(layer))
            .cloned()
    }

    pub fn items_in_container(&self, container: Serial, recursive: bool) -> Vec<ItemInfo> {
        let mut results = Vec::new();
        let mut pending = vec![container];

        while let Some(current) = pending.pop() {
            let children = Self::sorted(
                self.items.values().filter(|i| i.container == Some(current)),
                |i| i.serial,
            );
            for item in children {
                results.push(item.clone());
                if recursive {
                    pending.push(item.serial);
                }
            }
        }

        results
    }

    /// Number of item stacks directly inside `container`
    pub fn contents(&self, container: Serial) -> usize {
        if !self.items.contains_key(&container) {
            return 0;
        }
        self.items
            .values()
            .filter(|i| i.container == Some(container))
            .count()
    }

    /// Living, non-player mobiles matching `keep` within `max_distance`, nearest first
    fn scan_mobiles(
        &self,
        max_distance: u32,
        ignore: &IgnoreSet,
        keep: impl Fn(&MobileInfo) -> bool,
    ) -> Vec<(u32, &MobileInfo)> {
        let Some(player) = self.player.as_ref() else {
            return Vec::new();
        };

        let mut found: Vec<(u32, &MobileInfo)> = self
            .mobiles
            .values()
            .filter(|m| m.serial != player.serial && !m.is_dead && !ignore.contains(m.serial))
            .filter(|m| keep(m))
            .map(|m| (player.location.distance_to(&m.location), m))
            .filter(|(d, _)| *d <= max_distance)
            .collect();
        found.sort_by_key(|(d, m)| (*d, m.serial));
        found
    }

    pub fn nearest_mobiles(
        &self,
        filter: NotorietyFilter,
        max_distance: u32,
        ignore: &IgnoreSet,
    ) -> Vec<MobileInfo> {
        if filter.is_empty() {
            return Vec::new();
        }
        self.scan_mobiles(max_distance, ignore, |m| filter.accepts(m.notoriety))
            .into_iter()
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn nearest_mobile(
        &self,
        filter: NotorietyFilter,
        max_distance: u32,
        ignore: &IgnoreSet,
    ) -> Option<MobileInfo> {
        self.nearest_mobiles(filter, max_distance, ignore).into_iter().next()
    }

    pub fn nearest_corpse(&self, max_distance: u32, ignore: &IgnoreSet) -> Option<ItemInfo> {
        self.nearest_ground_item(max_distance, ignore, |i| i.is_corpse)
    }

    fn nearest_ground_item(
        &self,
        max_distance: u32,
        ignore: &IgnoreSet,
        keep: impl Fn(&ItemInfo) -> bool,
    ) -> Option<ItemInfo> {
        let player = self.player_location()?;
        self.items
            .values()
            .filter(|i| i.container.is_none() && !ignore.contains(i.serial) && keep(i))
            .map(|i| (player.distance_to(&i.location), i))
            .filter(|(d, _)| *d <= max_distance)
            .min_by_key(|(d, i)| (*d, i.serial))
            .map(|(_, i)| i.clone())
    }

    pub fn nearest_entity(&self, scan: ScanType, max_distance: u32, ignore: &IgnoreSet) -> Option<Serial> {
        let nearest = |keep: &dyn Fn(&MobileInfo) -> bool| {
            self.scan_mobiles(max_distance, ignore, keep)
                .first()
                .map(|(_, m)| m.serial)
        };

        match scan {
            ScanType::Hostile => nearest(&|m| NotorietyFilter::HOSTILE.accepts(m.notoriety)),
            ScanType::Party => nearest(&|m| m.in_party),
            ScanType::Followers => nearest(&|m| m.is_follower),
            ScanType::Mobiles => nearest(&|_| true),
            ScanType::Objects => self
                .nearest_ground_item(max_distance, ignore, |_| true)
                .map(|i| i.serial),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moongate_events::Notoriety;

    fn mobile(serial: u32, x: u16, notoriety: Notoriety) -> MobileInfo {
        MobileInfo {
            serial: Serial(serial),
            graphic: 0x190,
            hue: 0,
            name: format!("mobile {serial}"),
            location: Location::new(x, 100, 0),
            notoriety,
            is_dead: false,
            in_party: false,
            is_follower: false,
        }
    }

    fn item(serial: u32, graphic: Graphic, container: Option<u32>) -> ItemInfo {
        ItemInfo {
            serial: Serial(serial),
            graphic,
            hue: 0,
            amount: 1,
            name: String::new(),
            container: container.map(Serial),
            location: Location::new(100, 100, 0),
            layer: None,
            is_corpse: false,
        }
    }

    fn world() -> WorldView {
        let mut world = WorldView::new();
        world.apply(&HostEvent::PlayerUpdated {
            mobile: mobile(1, 100, Notoriety::Innocent),
        });
        world
    }

    #[test]
    fn test_nearest_mobile_orders_by_distance_and_honors_ignore() {
        let mut world = world();
        for (serial, x) in [(10, 105), (11, 102), (12, 120)] {
            world.apply(&HostEvent::MobileUpdated {
                mobile: mobile(serial, x, Notoriety::Murderer),
            });
        }

        let filter = NotorietyFilter::MURDERER;
        let mut ignore = IgnoreSet::new();
        assert_eq!(
            world.nearest_mobile(filter, 10, &ignore).map(|m| m.serial),
            Some(Serial(11))
        );

        ignore.ignore(Serial(11));
        let all: Vec<Serial> = world
            .nearest_mobiles(filter, 10, &ignore)
            .into_iter()
            .map(|m| m.serial)
            .collect();
        assert_eq!(all, vec![Serial(10)]);
    }

    #[test]
    fn test_dead_and_player_are_never_scanned() {
        let mut world = world();
        let mut dead = mobile(20, 101, Notoriety::Murderer);
        dead.is_dead = true;
        world.apply(&HostEvent::MobileUpdated { mobile: dead });

        let ignore = IgnoreSet::new();
        assert!(world.nearest_mobile(NotorietyFilter::all(), 10, &ignore).is_none());
        assert!(world.nearest_entity(ScanType::Mobiles, 10, &ignore).is_none());
    }

    #[test]
    fn test_find_type_filters() {
        let mut world = world();
        let mut stack = item(50, 0x0EED, Some(2));
        stack.amount = 200;
        world.apply(&HostEvent::ItemUpdated { item: item(2, 0x0E75, None) });
        world.apply(&HostEvent::ItemUpdated { item: stack });
        world.apply(&HostEvent::ItemUpdated { item: item(51, 0x0EED, None) });

        let ignore = IgnoreSet::new();
        let query = ItemQuery::graphic(0x0EED).in_container(Serial(2)).min_amount(100);
        assert_eq!(world.find_type(&query, &ignore).map(|i| i.serial), Some(Serial(50)));

        let ground = ItemQuery::graphic(0x0EED).within(2);
        let all = world.find_type_all(&ground, &ignore);
        assert_eq!(all.len(), 2);

        assert!(world.find_type(&ItemQuery::graphic(0x0EED).hue(33), &ignore).is_none());
    }

    #[test]
    fn test_items_in_container_recursive() {
        let mut world = world();
        world.apply(&HostEvent::ItemUpdated { item: item(2, 0x0E75, None) });
        world.apply(&HostEvent::ItemUpdated { item: item(3, 0x0E76, Some(2)) });
        world.apply(&HostEvent::ItemUpdated { item: item(4, 0x0EED, Some(3)) });

        assert_eq!(world.items_in_container(Serial(2), false).len(), 1);
        assert_eq!(world.items_in_container(Serial(2), true).len(), 2);
        assert_eq!(world.contents(Serial(2)), 1);
        assert_eq!(world.contents(Serial(99)), 0);
    }

    #[test]
    fn test_find_layer_defaults_to_player() {
        let mut world = world();
        let mut helm = item(30, 0x1408, Some(1));
        helm.layer = Some(Layer::Helmet);
        world.apply(&HostEvent::ItemUpdated { item: helm });

        assert_eq!(
            world.find_layer(Layer::Helmet, None).map(|i| i.serial),
            Some(Serial(30))
        );
        assert!(world.find_layer(Layer::Gloves, None).is_none());
    }

    #[test]
    fn test_object_removed() {
        let mut world = world();
        world.apply(&HostEvent::ItemUpdated { item: item(2, 0x0E75, None) });
        world.apply(&HostEvent::ObjectRemoved { serial: Serial(2) });
        assert!(!world.exists(Serial(2)));
    }
}
