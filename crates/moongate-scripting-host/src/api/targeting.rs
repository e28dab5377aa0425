use std::time::Duration;

use moongate_events::{CursorFilter, Graphic, HostAction, TargetChoice, TargetKind, TargetResult};
use tracing::{debug, warn};

use super::ScriptApi;
use crate::context::{Awaited, WaitOutcome};

fn as_result(choice: TargetChoice) -> TargetResult {
    match choice {
        TargetChoice::Object { serial } => TargetResult::Object { serial },
        TargetChoice::Location { location, graphic } => TargetResult::Location { location, graphic },
    }
}

impl ScriptApi {
    /// Wait for the server to open a cursor accepted by `filter`
    pub async fn wait_for_target(&self, filter: CursorFilter, timeout: Duration) -> bool {
        if self.has_target(filter) {
            return true;
        }
        let deadline = self.deadline_after(timeout);
        let outcome = self
            .suspend(Awaited::ServerCursor(filter), Some(deadline))
            .await;
        outcome == WaitOutcome::Ready
    }

    /// Ask the player to pick anything; `None` on timeout or cancel
    pub async fn request_target(&self, timeout: Duration) -> Option<TargetResult> {
        self.request_target_kind(TargetKind::Any, timeout).await
    }

    /// Ask the player to pick something with the engine's own cursor.
    ///
    /// Queues behind other scripts' requests while the cursor is busy; the
    /// timeout covers the time spent queued. A script holds at most one
    /// request: asking again while one is outstanding returns `None` at once
    /// and leaves the first request in place.
    pub async fn request_target_kind(
        &self,
        kind: TargetKind,
        timeout: Duration,
    ) -> Option<TargetResult> {
        let request = {
            let mut state = self.engine();
            if state.broker.has_request(self.id) {
                warn!(target: "scripting", "{} already has a target request outstanding", self.id);
                return None;
            }
            let deadline = state.now + timeout;
            let mut events = Vec::new();
            let request = state.broker.request(self.id, kind, deadline, &mut events);
            state.apply_broker_events(events);
            request
        };

        match self.suspend(Awaited::Target(request), None).await {
            WaitOutcome::Target(result) => result,
            _ => None,
        }
    }

    /// Answer the open server cursor
    pub fn target(&self, choice: impl Into<TargetChoice>) -> bool {
        let choice = choice.into();
        let mut state = self.engine();
        let Some(session) = state.broker.answer_server_cursor(as_result(choice)) else {
            debug!(target: "scripting", "{}: no server cursor to answer", self.id);
            return false;
        };
        state.send(self.id, HostAction::SendTarget { session, choice });
        true
    }

    pub fn target_self(&self) -> bool {
        let player = self.engine().world.player().map(|p| p.serial);
        match player {
            Some(serial) => self.target(serial),
            None => false,
        }
    }

    /// Target the tile at an offset from the player, optionally a static on it
    pub fn target_relative(&self, dx: i32, dy: i32, graphic: Option<Graphic>) -> bool {
        let player = self.engine().world.player().map(|p| p.location);
        let Some(origin) = player else {
            return false;
        };
        self.target(TargetChoice::Location {
            location: origin.offset(dx, dy, 0),
            graphic,
        })
    }

    /// Withdraw this script's target request, or dismiss the server cursor
    pub fn cancel_target(&self) {
        let mut state = self.engine();
        let now = state.now;
        let mut events = Vec::new();
        if state.broker.cancel_for(self.id, now, &mut events) {
            state.apply_broker_events(events);
            return;
        }
        state.apply_broker_events(events);

        if let Some(cursor) = state.broker.server_cursor(CursorFilter::Any) {
            state.broker.server_closed(cursor.session);
            state.send(
                self.id,
                HostAction::CancelTargetCursor {
                    session: cursor.session,
                },
            );
        }
    }

    /// A server cursor accepted by `filter` is open
    pub fn has_target(&self, filter: CursorFilter) -> bool {
        self.engine().broker.server_cursor(filter).is_some()
    }

    pub fn last_target(&self) -> Option<TargetResult> {
        self.engine().broker.last_target()
    }
}
