//! Target Broker: arbitration of the host's single targeting cursor.
//!
//! Scripts asking the player to pick something share one live cursor. The
//! first requester arms it; later requesters wait in arrival order and are
//! armed as soon as the cursor frees up, provided their own deadline has not
//! passed. Cursors opened by the server (spells, skills) are tracked
//! separately so scripts can wait for and answer them.

use std::collections::VecDeque;
use std::time::Instant;

use moongate_events::{CursorFilter, CursorKind, ScriptId, TargetKind, TargetResult, TargetSession};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRequestId(pub u64);

#[derive(Debug, Clone)]
struct TargetRequest {
    id: TargetRequestId,
    script: ScriptId,
    kind: TargetKind,
    deadline: Instant,
}

#[derive(Debug, Clone)]
struct ArmedRequest {
    request: TargetRequest,
    session: TargetSession,
}

/// How a target request finished
#[derive(Debug, Clone, PartialEq)]
pub enum TargetResolution {
    Fulfilled(TargetResult),
    TimedOut,
    /// The player dismissed the cursor, or the requester stopped
    Canceled,
}

/// Side effects the broker asks its owner to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerEvent {
    /// Show the live cursor to the player on behalf of `script`
    Armed {
        script: ScriptId,
        session: TargetSession,
        kind: TargetKind,
    },
    /// Retract a cursor the engine armed
    Disarmed { session: TargetSession },
    Resolved {
        script: ScriptId,
        request: TargetRequestId,
        resolution: TargetResolution,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerCursor {
    pub session: TargetSession,
    pub kind: CursorKind,
}

#[derive(Default)]
pub struct TargetBroker {
    armed: Option<ArmedRequest>,
    waiting: VecDeque<TargetRequest>,
    server_cursor: Option<ServerCursor>,
    last_target: Option<TargetResult>,
    next_request: u64,
    next_session: u32,
}

impl TargetBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a target on behalf of `script`.
    ///
    /// Arms the cursor immediately when it is free, otherwise queues the
    /// request behind the ones already waiting.
    pub fn request(
        &mut self,
        script: ScriptId,
        kind: TargetKind,
        deadline: Instant,
        events: &mut Vec<BrokerEvent>,
    ) -> TargetRequestId {
        let id = TargetRequestId(self.next_request);
        self.next_request += 1;

        let request = TargetRequest {
            id,
            script,
            kind,
            deadline,
        };

        if self.armed.is_none() {
            self.arm(request, events);
        } else {
            debug!(target: "scripting", "Target cursor busy, {} queued behind {} waiter(s)", script, self.waiting.len());
            self.waiting.push_back(request);
        }

        id
    }

    /// Route a cursor result from the host to the armed request
    pub fn fulfill(
        &mut self,
        session: TargetSession,
        result: TargetResult,
        now: Instant,
        events: &mut Vec<BrokerEvent>,
    ) {
        match &self.armed {
            Some(armed) if armed.session == session => {}
            _ => {
                debug!(target: "scripting", "Ignoring target result for stale session {:?}", session);
                return;
            }
        }

        if let Some(armed) = self.armed.take() {
            self.last_target = Some(result);
            events.push(BrokerEvent::Resolved {
                script: armed.request.script,
                request: armed.request.id,
                resolution: TargetResolution::Fulfilled(result),
            });
        }
        self.arm_next(now, events);
    }

    /// The player dismissed the armed cursor
    pub fn host_cancel(&mut self, session: TargetSession, now: Instant, events: &mut Vec<BrokerEvent>) {
        let Some(armed) = self.armed.take_if(|a| a.session == session) else {
            return;
        };

        events.push(BrokerEvent::Resolved {
            script: armed.request.script,
            request: armed.request.id,
            resolution: TargetResolution::Canceled,
        });
        self.arm_next(now, events);
    }

    /// Time out every request whose deadline has passed, armed or queued
    pub fn expire(&mut self, now: Instant, events: &mut Vec<BrokerEvent>) {
        if let Some(armed) = self.armed.take_if(|a| now >= a.request.deadline) {
            debug!(target: "scripting", "Target request for {} timed out", armed.request.script);
            events.push(BrokerEvent::Disarmed {
                session: armed.session,
            });
            events.push(BrokerEvent::Resolved {
                script: armed.request.script,
                request: armed.request.id,
                resolution: TargetResolution::TimedOut,
            });
        }

        self.expire_waiting(now, events);

        if self.armed.is_none() {
            self.arm_next(now, events);
        }
    }

    /// Drop every request `script` owns; frees the cursor for the next waiter
    pub fn cancel_for(&mut self, script: ScriptId, now: Instant, events: &mut Vec<BrokerEvent>) -> bool {
        let mut canceled = false;

        if let Some(armed) = self.armed.take_if(|a| a.request.script == script) {
            events.push(BrokerEvent::Disarmed {
                session: armed.session,
            });
            events.push(BrokerEvent::Resolved {
                script,
                request: armed.request.id,
                resolution: TargetResolution::Canceled,
            });
            canceled = true;
        }

        let before = self.waiting.len();
        self.waiting.retain(|r| r.script != script);
        canceled |= self.waiting.len() != before;

        if self.armed.is_none() {
            self.arm_next(now, events);
        }

        canceled
    }

    pub fn armed_for(&self) -> Option<ScriptId> {
        self.armed.as_ref().map(|a| a.request.script)
    }

    pub fn has_request(&self, script: ScriptId) -> bool {
        self.armed_for() == Some(script) || self.waiting.iter().any(|r| r.script == script)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn last_target(&self) -> Option<TargetResult> {
        self.last_target
    }

    pub fn server_opened(&mut self, session: TargetSession, kind: CursorKind) {
        self.server_cursor = Some(ServerCursor { session, kind });
    }

    pub fn server_closed(&mut self, session: TargetSession) {
        self.server_cursor.take_if(|c| c.session == session);
    }

    /// Server cursor currently open, if it passes `filter`
    pub fn server_cursor(&self, filter: CursorFilter) -> Option<ServerCursor> {
        self.server_cursor.filter(|c| filter.accepts(c.kind))
    }

    /// Consume the server cursor to answer it, recording the answer as last target
    pub fn answer_server_cursor(&mut self, result: TargetResult) -> Option<TargetSession> {
        let cursor = self.server_cursor.take()?;
        self.last_target = Some(result);
        Some(cursor.session)
    }

    fn arm(&mut self, request: TargetRequest, events: &mut Vec<BrokerEvent>) {
        let session = TargetSession(self.next_session);
        self.next_session = self.next_session.wrapping_add(1);

        debug!(target: "scripting", "Arming target cursor for {} ({:?})", request.script, session);
        events.push(BrokerEvent::Armed {
            script: request.script,
            session,
            kind: request.kind,
        });
        self.armed = Some(ArmedRequest { request, session });
    }

    fn arm_next(&mut self, now: Instant, events: &mut Vec<BrokerEvent>) {
        self.expire_waiting(now, events);
        if let Some(next) = self.waiting.pop_front() {
            self.arm(next, events);
        }
    }

    fn expire_waiting(&mut self, now: Instant, events: &mut Vec<BrokerEvent>) {
        let mut kept = VecDeque::with_capacity(self.waiting.len());
        for request in self.waiting.drain(..) {
            if now >= request.deadline {
                events.push(BrokerEvent::Resolved {
                    script: request.script,
                    request: request.id,
                    resolution: TargetResolution::TimedOut,
                });
            } else {
                kept.push_back(request);
            }
        }
        self.waiting = kept;
    }
}
