use moongate_events::{ItemInfo, Layer, MobileInfo, NotorietyFilter, ScanType, Serial};
use tracing::warn;

use super::ScriptApi;
use crate::world::ItemQuery;

/// Range used by scans when the caller has no better idea
pub const DEFAULT_SCAN_DISTANCE: u32 = 10;
pub const DEFAULT_CORPSE_DISTANCE: u32 = 3;

impl ScriptApi {
    pub fn player(&self) -> Option<MobileInfo> {
        self.engine().world.player().cloned()
    }

    pub fn find_item(&self, serial: Serial) -> Option<ItemInfo> {
        self.engine().world.item(serial).cloned()
    }

    pub fn find_mobile(&self, serial: Serial) -> Option<MobileInfo> {
        self.engine().world.mobile(serial).cloned()
    }

    /// First item matching `query`, skipping this script's ignore list
    pub fn find_type(&self, query: &ItemQuery) -> Option<ItemInfo> {
        let state = self.engine();
        let ctx = state.contexts.get(&self.id)?;
        state.world.find_type(query, &ctx.ignore)
    }

    pub fn find_type_all(&self, query: &ItemQuery) -> Vec<ItemInfo> {
        let state = self.engine();
        match state.contexts.get(&self.id) {
            Some(ctx) => state.world.find_type_all(query, &ctx.ignore),
            None => Vec::new(),
        }
    }

    /// Item worn on `layer` by `mobile`, or by the player when `None`
    pub fn find_layer(&self, layer: Layer, mobile: Option<Serial>) -> Option<ItemInfo> {
        self.engine().world.find_layer(layer, mobile)
    }

    /// `find_layer` with the layer given by name, case-insensitively
    pub fn find_layer_named(&self, layer: &str, mobile: Option<Serial>) -> Option<ItemInfo> {
        match layer.parse::<Layer>() {
            Ok(layer) => self.find_layer(layer, mobile),
            Err(e) => {
                warn!(target: "scripting", "{}: {}", self.id, e);
                None
            }
        }
    }

    pub fn nearest_entity(&self, scan: ScanType, max_distance: u32) -> Option<Serial> {
        let state = self.engine();
        let ctx = state.contexts.get(&self.id)?;
        state.world.nearest_entity(scan, max_distance, &ctx.ignore)
    }

    /// Closest living mobile whose notoriety passes `filter`
    pub fn nearest_mobile(&self, filter: NotorietyFilter, max_distance: u32) -> Option<MobileInfo> {
        let state = self.engine();
        let ctx = state.contexts.get(&self.id)?;
        state.world.nearest_mobile(filter, max_distance, &ctx.ignore)
    }

    pub fn nearest_mobiles(&self, filter: NotorietyFilter, max_distance: u32) -> Vec<MobileInfo> {
        let state = self.engine();
        match state.contexts.get(&self.id) {
            Some(ctx) => state.world.nearest_mobiles(filter, max_distance, &ctx.ignore),
            None => Vec::new(),
        }
    }

    pub fn nearest_corpse(&self, max_distance: u32) -> Option<ItemInfo> {
        let state = self.engine();
        let ctx = state.contexts.get(&self.id)?;
        state.world.nearest_corpse(max_distance, &ctx.ignore)
    }

    /// Use the first item matching `query`
    pub async fn use_type(&self, query: &ItemQuery) -> bool {
        let found = self.find_type(query).map(|item| item.serial);
        match found {
            Some(serial) => self.use_object(serial).await,
            None => false,
        }
    }

    // ===== Ignore list =====

    pub fn ignore_object(&self, serial: Serial) {
        self.with_context(|ctx| ctx.ignore.ignore(serial));
    }

    pub fn clear_ignore_list(&self) {
        self.with_context(|ctx| ctx.ignore.clear());
    }

    pub fn on_ignore_list(&self, serial: Serial) -> bool {
        self.with_context(|ctx| ctx.ignore.contains(serial))
            .unwrap_or(false)
    }
}
