//! Gump Bridge: script-built panels, their control trees and click routing.
//!
//! Clicks and closes reported by the host never run script code directly.
//! The bridge only resolves which callbacks they address; the scheduler
//! appends those to the owning script's pending queue, which the script
//! drains itself.

pub mod controls;

use std::collections::{BTreeMap, HashMap};

use moongate_events::{
    ControlId, ControlKind, ControlNode, GumpConfig, GumpId, GumpLayout, MouseButton, Rect,
    ScriptId, ServerGumpId,
};

use crate::context::CallbackId;
use crate::journal::TextPattern;

pub struct ScriptGump {
    pub id: GumpId,
    pub owner: ScriptId,
    pub config: GumpConfig,
    pub controls: Vec<ControlNode>,
    pub visible: bool,
    next_control: u32,
}

impl ScriptGump {
    pub fn layout(&self) -> GumpLayout {
        GumpLayout {
            config: self.config.clone(),
            controls: self.controls.clone(),
        }
    }

    fn find(&self, id: ControlId) -> Option<&ControlNode> {
        self.controls.iter().find_map(|c| c.find(id))
    }

    fn find_mut(&mut self, id: ControlId) -> Option<&mut ControlNode> {
        self.controls.iter_mut().find_map(|c| c.find_mut(id))
    }

    pub fn contains_text(&self, pattern: &TextPattern) -> bool {
        let mut nodes = Vec::new();
        for control in &self.controls {
            control.walk(&mut nodes);
        }
        nodes
            .iter()
            .filter_map(|n| n.kind.text())
            .any(|t| pattern.is_match(t))
    }
}

/// A gump the game server opened, addressed by its server id
#[derive(Debug, Clone)]
pub struct ServerGump {
    pub id: ServerGumpId,
    pub texts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickRoute {
    pub script: ScriptId,
    pub callback: CallbackId,
    pub left_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRoute {
    pub script: ScriptId,
    pub callback: CallbackId,
}

/// Everything left over once a gump is gone
pub struct ClosedGump {
    pub gump: ScriptGump,
    /// Click callbacks that can no longer fire
    pub dead_clicks: Vec<ClickRoute>,
    /// Close callbacks to queue for their scripts
    pub on_closed: Vec<CloseRoute>,
}

#[derive(Default)]
pub struct GumpBridge {
    gumps: BTreeMap<GumpId, ScriptGump>,
    clicks: HashMap<(GumpId, ControlId), Vec<ClickRoute>>,
    closes: HashMap<GumpId, Vec<CloseRoute>>,
    server: Vec<ServerGump>,
    next_gump: u32,
}

impl GumpBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an empty gump for `owner`; it is not shown until [`Self::show`]
    pub fn create(&mut self, owner: ScriptId, config: GumpConfig) -> GumpId {
        self.next_gump += 1;
        let id = GumpId(self.next_gump);
        self.gumps.insert(
            id,
            ScriptGump {
                id,
                owner,
                config,
                controls: Vec::new(),
                visible: false,
                next_control: 0,
            },
        );
        id
    }

    pub fn get(&self, gump: GumpId) -> Option<&ScriptGump> {
        self.gumps.get(&gump)
    }

    pub fn owner(&self, gump: GumpId) -> Option<ScriptId> {
        self.gumps.get(&gump).map(|g| g.owner)
    }

    /// Add a control at the top level, or inside a container control
    pub fn add_control(
        &mut self,
        gump: GumpId,
        parent: Option<ControlId>,
        kind: ControlKind,
        rect: Rect,
    ) -> Option<ControlId> {
        let g = self.gumps.get_mut(&gump)?;
        g.next_control += 1;
        let node = ControlNode {
            id: ControlId(g.next_control),
            kind,
            rect,
            children: Vec::new(),
        };
        let id = node.id;

        match parent {
            None => g.controls.push(node),
            Some(parent) => {
                let container = g.find_mut(parent).filter(|p| p.kind.is_container())?;
                container.children.push(node);
            }
        }

        Some(id)
    }

    /// Make a gump visible; returns the layout to send to the host
    pub fn show(&mut self, gump: GumpId) -> Option<GumpLayout> {
        let g = self.gumps.get_mut(&gump)?;
        g.visible = true;
        Some(g.layout())
    }

    pub fn is_visible(&self, gump: GumpId) -> bool {
        self.gumps.get(&gump).is_some_and(|g| g.visible)
    }

    pub fn register_click(&mut self, gump: GumpId, control: ControlId, route: ClickRoute) -> bool {
        let Some(g) = self.gumps.get(&gump) else {
            return false;
        };
        if g.find(control).is_none() {
            return false;
        }
        self.clicks.entry((gump, control)).or_default().push(route);
        true
    }

    pub fn register_close(&mut self, gump: GumpId, route: CloseRoute) -> bool {
        if !self.gumps.contains_key(&gump) {
            return false;
        }
        self.closes.entry(gump).or_default().push(route);
        true
    }

    /// Callbacks addressed by a click on a visible gump, in registration order
    pub fn click(&self, gump: GumpId, control: ControlId, button: MouseButton) -> Vec<ClickRoute> {
        if !self.is_visible(gump) {
            return Vec::new();
        }
        self.clicks
            .get(&(gump, control))
            .map(|routes| {
                routes
                    .iter()
                    .filter(|r| !r.left_only || button == MouseButton::Left)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn close(&mut self, gump: GumpId) -> Option<ClosedGump> {
        let gump_state = self.gumps.remove(&gump)?;

        let mut dead_clicks = Vec::new();
        self.clicks.retain(|(g, _), routes| {
            if *g == gump {
                dead_clicks.append(routes);
                false
            } else {
                true
            }
        });

        Some(ClosedGump {
            gump: gump_state,
            dead_clicks,
            on_closed: self.closes.remove(&gump).unwrap_or_default(),
        })
    }

    /// Gumps owned by `script`, optionally skipping those flagged keep-open
    pub fn owned_by(&self, script: ScriptId, include_keep_open: bool) -> Vec<GumpId> {
        self.gumps
            .values()
            .filter(|g| g.owner == script && (include_keep_open || !g.config.keep_open))
            .map(|g| g.id)
            .collect()
    }

    /// Visible gumps created by `script`
    pub fn visible_for(&self, script: ScriptId) -> impl Iterator<Item = &ScriptGump> {
        self.gumps
            .values()
            .filter(move |g| g.owner == script && g.visible)
    }

    /// Remove every route registered by `script` on gumps it does not own
    pub fn forget_routes_of(&mut self, script: ScriptId) {
        for routes in self.clicks.values_mut() {
            routes.retain(|r| r.script != script);
        }
        for routes in self.closes.values_mut() {
            routes.retain(|r| r.script != script);
        }
    }

    pub fn server_opened(&mut self, id: ServerGumpId, texts: Vec<String>) {
        self.server.retain(|g| g.id != id);
        self.server.push(ServerGump { id, texts });
    }

    pub fn server_closed(&mut self, id: ServerGumpId) -> bool {
        let before = self.server.len();
        self.server.retain(|g| g.id != id);
        before != self.server.len()
    }

    /// A specific server gump, or the most recently opened one
    pub fn server_gump(&self, id: Option<ServerGumpId>) -> Option<&ServerGump> {
        match id {
            Some(id) => self.server.iter().find(|g| g.id == id),
            None => self.server.last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gump::controls;

    fn route(script: u64, callback: u64, left_only: bool) -> ClickRoute {
        ClickRoute {
            script: ScriptId(script),
            callback: CallbackId(callback),
            left_only,
        }
    }

    #[test]
    fn test_clicks_only_route_on_visible_gumps() {
        let mut bridge = GumpBridge::new();
        let gump = bridge.create(ScriptId(1), GumpConfig::default());
        let button = bridge
            .add_control(gump, None, controls::simple_button("Go"), Rect::default())
            .unwrap();
        assert!(bridge.register_click(gump, button, route(1, 0, true)));

        assert!(bridge.click(gump, button, MouseButton::Left).is_empty());

        bridge.show(gump);
        assert_eq!(bridge.click(gump, button, MouseButton::Left), vec![route(1, 0, true)]);
        assert!(bridge.click(gump, button, MouseButton::Right).is_empty());
    }

    #[test]
    fn test_children_only_inside_containers() {
        let mut bridge = GumpBridge::new();
        let gump = bridge.create(ScriptId(1), GumpConfig::default());
        let label = bridge
            .add_control(gump, None, controls::label("hi"), Rect::default())
            .unwrap();
        let area = bridge
            .add_control(gump, None, controls::scroll_area(), Rect::default())
            .unwrap();

        assert!(bridge.add_control(gump, Some(label), controls::label("no"), Rect::default()).is_none());
        let nested = bridge
            .add_control(gump, Some(area), controls::label("Hello there"), Rect::default())
            .unwrap();

        assert!(bridge.register_click(gump, nested, route(1, 0, false)));
        assert!(bridge.get(gump).unwrap().contains_text(&TextPattern::parse("there")));
    }

    #[test]
    fn test_close_returns_routes() {
        let mut bridge = GumpBridge::new();
        let gump = bridge.create(ScriptId(1), GumpConfig::default());
        let button = bridge
            .add_control(gump, None, controls::simple_button("Go"), Rect::default())
            .unwrap();
        bridge.register_click(gump, button, route(1, 0, true));
        bridge.register_close(
            gump,
            CloseRoute {
                script: ScriptId(1),
                callback: CallbackId(1),
            },
        );

        let closed = bridge.close(gump).unwrap();
        assert_eq!(closed.dead_clicks.len(), 1);
        assert_eq!(closed.on_closed.len(), 1);
        assert!(bridge.get(gump).is_none());
        assert!(bridge.close(gump).is_none());
    }

    #[test]
    fn test_keep_open_excluded_from_owned() {
        let mut bridge = GumpBridge::new();
        let plain = bridge.create(ScriptId(1), GumpConfig::default());
        let pinned = bridge.create(ScriptId(1), GumpConfig::default().keep_open());
        bridge.create(ScriptId(2), GumpConfig::default());

        assert_eq!(bridge.owned_by(ScriptId(1), false), vec![plain]);
        assert_eq!(bridge.owned_by(ScriptId(1), true), vec![plain, pinned]);
    }

    #[test]
    fn test_server_gump_defaults_to_last_opened() {
        let mut bridge = GumpBridge::new();
        bridge.server_opened(ServerGumpId(10), vec![]);
        bridge.server_opened(ServerGumpId(20), vec!["Bank".into()]);

        assert_eq!(bridge.server_gump(None).map(|g| g.id), Some(ServerGumpId(20)));
        assert!(bridge.server_closed(ServerGumpId(20)));
        assert_eq!(bridge.server_gump(None).map(|g| g.id), Some(ServerGumpId(10)));
        assert!(bridge.server_gump(Some(ServerGumpId(20))).is_none());
    }
}
