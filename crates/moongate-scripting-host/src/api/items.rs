use moongate_events::{ItemInfo, Serial};
use tracing::warn;

use super::ScriptApi;
use crate::move_queue::MoveRequest;

impl ScriptApi {
    /// Relocate an item now and wait for the host to confirm.
    ///
    /// Counts against the shared pacing interval like a queued move.
    pub async fn move_item(&self, request: MoveRequest) -> bool {
        let action = {
            let mut state = self.engine();
            if let Err(reason) = state.check_move(&request) {
                warn!(target: "scripting", "{}: cannot move {}: {}", self.id, request.serial, reason);
                return false;
            }
            let now = state.now;
            state.pacer.mark(now);
            request.to_action()
        };
        self.send_confirmed(action).await
    }

    /// Append to this script's move queue; the scheduler sends it on a later tick
    pub fn que_move_item(&self, request: MoveRequest) {
        self.with_context(|ctx| ctx.moves.push(request));
    }

    /// Ground drop relative to the player's position
    fn offset_request(
        &self,
        serial: Serial,
        amount: u16,
        offset: (i32, i32, i32),
        osi: bool,
    ) -> Option<MoveRequest> {
        let Some(player) = self.engine().world.player().map(|p| p.location) else {
            warn!(target: "scripting", "{}: no player position for an offset move", self.id);
            return None;
        };
        let (dx, dy, dz) = offset;
        let location = player.offset(dx, dy, dz);
        Some(MoveRequest::to_ground(serial, location, osi).amount(amount))
    }

    pub async fn move_item_offset(
        &self,
        serial: Serial,
        amount: u16,
        offset: (i32, i32, i32),
        osi: bool,
    ) -> bool {
        match self.offset_request(serial, amount, offset, osi) {
            Some(request) => self.move_item(request).await,
            None => false,
        }
    }

    pub fn que_move_item_offset(
        &self,
        serial: Serial,
        amount: u16,
        offset: (i32, i32, i32),
        osi: bool,
    ) -> bool {
        match self.offset_request(serial, amount, offset, osi) {
            Some(request) => {
                self.que_move_item(request);
                true
            }
            None => false,
        }
    }

    /// Drop every queued move of this script; returns how many were dropped
    pub fn clear_move_queue(&self) -> usize {
        self.with_context(|ctx| ctx.moves.clear()).unwrap_or(0)
    }

    pub fn is_processing_move_queue(&self) -> bool {
        self.with_context(|ctx| !ctx.moves.is_empty())
            .unwrap_or(false)
    }

    pub fn items_in_container(&self, container: Serial, recursive: bool) -> Vec<ItemInfo> {
        self.engine().world.items_in_container(container, recursive)
    }

    /// Number of items directly inside `container`
    pub fn contents(&self, container: Serial) -> usize {
        self.engine().world.contents(container)
    }
}
