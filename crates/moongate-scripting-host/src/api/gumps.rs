use std::time::Duration;

use moongate_events::{
    ControlId, ControlKind, GumpConfig, GumpId, HostAction, Rect, ServerGumpId,
};
use tracing::{debug, warn};

use super::ScriptApi;
use crate::context::{Awaited, WaitOutcome};
use crate::gump::{ClickRoute, CloseRoute};
use crate::journal::TextPattern;

impl ScriptApi {
    // ===== Script gumps =====

    /// New empty gump owned by this script; not shown until `add_gump`
    pub fn create_gump(&self, config: GumpConfig) -> GumpId {
        self.engine().gumps.create(self.id, config)
    }

    pub fn add_control(&self, gump: GumpId, kind: ControlKind, rect: Rect) -> Option<ControlId> {
        self.insert_control(gump, None, kind, rect)
    }

    /// Add a control inside a container control such as a scroll area
    pub fn add_child_control(
        &self,
        gump: GumpId,
        parent: ControlId,
        kind: ControlKind,
        rect: Rect,
    ) -> Option<ControlId> {
        self.insert_control(gump, Some(parent), kind, rect)
    }

    fn insert_control(
        &self,
        gump: GumpId,
        parent: Option<ControlId>,
        kind: ControlKind,
        rect: Rect,
    ) -> Option<ControlId> {
        let mut state = self.engine();
        if state.gumps.owner(gump) != Some(self.id) {
            warn!(target: "scripting", "{}: gump {:?} is not ours to edit", self.id, gump);
            return None;
        }
        let control = state.gumps.add_control(gump, parent, kind, rect)?;

        // Visible gumps are re-sent whole
        if state.gumps.is_visible(gump) {
            if let Some(layout) = state.gumps.show(gump) {
                state.send(self.id, HostAction::ShowGump { gump, layout });
            }
        }
        Some(control)
    }

    /// Show the gump; clicks on it are captured from now on
    pub fn add_gump(&self, gump: GumpId) -> bool {
        let mut state = self.engine();
        if state.gumps.owner(gump) != Some(self.id) {
            return false;
        }
        let Some(layout) = state.gumps.show(gump) else {
            return false;
        };
        state.send(self.id, HostAction::ShowGump { gump, layout });
        true
    }

    /// Queue `callback` for this script whenever `control` is clicked
    pub fn add_control_on_click(
        &self,
        gump: GumpId,
        control: ControlId,
        left_only: bool,
        callback: impl FnMut(&ScriptApi) + 'static,
    ) -> bool {
        let mut state = self.engine();
        let Some(callback) = state
            .contexts
            .get_mut(&self.id)
            .map(|ctx| ctx.add_callback(Box::new(callback), gump, false))
        else {
            return false;
        };

        let route = ClickRoute {
            script: self.id,
            callback,
            left_only,
        };
        if state.gumps.register_click(gump, control, route) {
            return true;
        }

        warn!(target: "scripting", "{}: no control {:?} on gump {:?}", self.id, control, gump);
        if let Some(ctx) = state.contexts.get_mut(&self.id) {
            ctx.drop_gump_callbacks(gump, &[callback]);
        }
        false
    }

    /// Queue `callback` once when the host closes the gump
    pub fn add_gump_on_closed(
        &self,
        gump: GumpId,
        callback: impl FnMut(&ScriptApi) + 'static,
    ) -> bool {
        let mut state = self.engine();
        let Some(callback) = state
            .contexts
            .get_mut(&self.id)
            .map(|ctx| ctx.add_callback(Box::new(callback), gump, true))
        else {
            return false;
        };

        if state.gumps.register_close(gump, CloseRoute { script: self.id, callback }) {
            return true;
        }
        if let Some(ctx) = state.contexts.get_mut(&self.id) {
            ctx.drop_gump_callbacks(gump, &[callback]);
        }
        false
    }

    /// Run every queued callback of this script in arrival order.
    ///
    /// Callbacks queued while this runs are run too. Returns how many ran.
    pub fn process_callbacks(&self) -> usize {
        let mut ran = 0;
        while let Some(pending) = self.with_context(|ctx| ctx.take_pending()).flatten() {
            let Some((mut callback, once)) = self
                .with_context(|ctx| ctx.take_callback(pending.callback))
                .flatten()
            else {
                continue;
            };

            callback(self);
            ran += 1;

            if !once {
                self.with_context(|ctx| ctx.restore_callback(pending.callback, callback));
            }
        }
        ran
    }

    /// Close one of this script's gumps
    pub fn close_gump(&self, gump: GumpId) -> bool {
        let mut state = self.engine();
        if state.gumps.owner(gump) != Some(self.id) {
            return false;
        }
        state.close_gump(gump, true)
    }

    /// Close this script's gumps, sparing those flagged keep-open
    pub fn close_gumps(&self) -> usize {
        let mut state = self.engine();
        let owned = state.gumps.owned_by(self.id, false);
        owned
            .into_iter()
            .filter(|gump| state.close_gump(*gump, true))
            .count()
    }

    /// `gump` is visible, or with `None`, any gump of this script is
    pub fn has_gump(&self, gump: Option<GumpId>) -> bool {
        let state = self.engine();
        match gump {
            Some(gump) => state.gumps.owner(gump) == Some(self.id) && state.gumps.is_visible(gump),
            None => state.gumps.visible_for(self.id).next().is_some(),
        }
    }

    /// Some control text on the gump matches; `$` prefix makes it a regex
    pub fn gump_contains(&self, text: &str, gump: Option<GumpId>) -> bool {
        let pattern = TextPattern::parse(text);
        let state = self.engine();
        state
            .gumps
            .visible_for(self.id)
            .filter(|g| gump.is_none_or(|id| g.id == id))
            .any(|g| g.contains_text(&pattern))
    }

    // ===== Server gumps =====

    /// Id of the server gump `id`, or of the latest one, if it is open
    pub fn has_server_gump(&self, id: Option<ServerGumpId>) -> Option<ServerGumpId> {
        self.engine().gumps.server_gump(id).map(|g| g.id)
    }

    pub fn server_gump_contains(&self, text: &str, id: Option<ServerGumpId>) -> bool {
        let pattern = TextPattern::parse(text);
        let state = self.engine();
        state
            .gumps
            .server_gump(id)
            .is_some_and(|g| g.texts.iter().any(|t| pattern.is_match(t)))
    }

    /// Press `button` on a server gump and wait for the host to confirm
    pub async fn reply_gump(&self, button: u32, id: Option<ServerGumpId>) -> bool {
        let gump = {
            let mut state = self.engine();
            let Some(gump) = state.gumps.server_gump(id).map(|g| g.id) else {
                debug!(target: "scripting", "{}: no server gump to reply to", self.id);
                return false;
            };
            // Replying closes it on the client
            state.gumps.server_closed(gump);
            gump
        };
        self.send_confirmed(HostAction::ReplyServerGump { gump, button })
            .await
    }

    /// Wait for a server gump to open; `None` accepts any
    pub async fn wait_for_gump(&self, id: Option<ServerGumpId>, timeout: Duration) -> bool {
        if self.has_server_gump(id).is_some() {
            return true;
        }
        let deadline = self.deadline_after(timeout);
        let outcome = self.suspend(Awaited::ServerGump(id), Some(deadline)).await;
        outcome == WaitOutcome::Ready
    }

    pub fn close_server_gump(&self, id: Option<ServerGumpId>) -> bool {
        let mut state = self.engine();
        let Some(gump) = state.gumps.server_gump(id).map(|g| g.id) else {
            return false;
        };
        state.gumps.server_closed(gump);
        state.send(self.id, HostAction::CloseServerGump { gump });
        true
    }
}
