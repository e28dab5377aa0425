//! Engine state shared by the scheduler and every script's API handle.
//!
//! Only the driver thread touches this, and only between polls or inside a
//! synchronous API call, so a `RefCell` is enough.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Instant;

use moongate_config::EngineConfig;
use moongate_events::{
    ActionOutcome, EngineOutput, GumpId, HostAction, HostEvent, MoveDestination, ScriptId,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::actions::ActionSink;
use crate::context::{Awaited, CallbackId, ScriptContext, ScriptState, WaitOutcome};
use crate::gump::GumpBridge;
use crate::journal::JournalStore;
use crate::move_queue::{MovePacer, MoveRequest};
use crate::target::{BrokerEvent, TargetBroker, TargetResolution};
use crate::vars::{PersistentVars, SharedVars};
use crate::world::WorldView;

/// Script lifecycle requests made from inside a script, handled after its poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LifecycleCommand {
    Play(String),
    Stop(String),
    Toggle(String),
}

pub struct EngineState {
    pub(crate) now: Instant,
    pub(crate) config: EngineConfig,
    pub(crate) contexts: BTreeMap<ScriptId, ScriptContext>,
    pub(crate) world: WorldView,
    pub(crate) journal: JournalStore,
    pub(crate) broker: TargetBroker,
    pub(crate) gumps: GumpBridge,
    pub(crate) pacer: MovePacer,
    /// Script whose queue fed the last relocation
    move_turn: Option<ScriptId>,
    pub(crate) shared: SharedVars,
    pub(crate) persistent: PersistentVars,
    pub(crate) sink: ActionSink,
    pub(crate) lifecycle: Vec<LifecycleCommand>,
}

impl EngineState {
    pub(crate) fn new(
        config: EngineConfig,
        output_tx: UnboundedSender<EngineOutput>,
        persistent: PersistentVars,
        now: Instant,
    ) -> Self {
        Self {
            now,
            journal: JournalStore::new(config.journal_capacity),
            pacer: MovePacer::new(config.move_pacing()),
            config,
            contexts: BTreeMap::new(),
            world: WorldView::new(),
            broker: TargetBroker::new(),
            gumps: GumpBridge::new(),
            move_turn: None,
            shared: SharedVars::default(),
            persistent,
            sink: ActionSink::new(output_tx),
            lifecycle: Vec::new(),
        }
    }

    pub(crate) fn send(&mut self, origin: ScriptId, action: HostAction) -> moongate_events::ActionId {
        self.sink.send(Some(origin), action)
    }

    pub(crate) fn apply_event(&mut self, event: HostEvent) {
        self.world.apply(&event);

        match event {
            HostEvent::JournalLine { text, source } => {
                self.journal.append(text, source, self.now);
            }
            HostEvent::TargetCursorOpened { session, kind } => {
                self.broker.server_opened(session, kind);
            }
            HostEvent::TargetCursorClosed { session } => {
                self.broker.server_closed(session);
            }
            HostEvent::TargetResult { session, result } => {
                let mut events = Vec::new();
                self.broker.fulfill(session, result, self.now, &mut events);
                self.apply_broker_events(events);
            }
            HostEvent::TargetCanceled { session } => {
                let mut events = Vec::new();
                self.broker.host_cancel(session, self.now, &mut events);
                self.apply_broker_events(events);
            }
            HostEvent::ServerGumpOpened { gump, texts } => {
                self.gumps.server_opened(gump, texts);
            }
            HostEvent::ServerGumpClosed { gump } => {
                self.gumps.server_closed(gump);
            }
            HostEvent::ControlClicked {
                gump,
                control,
                button,
            } => {
                for route in self.gumps.click(gump, control, button) {
                    if let Some(ctx) = self.contexts.get_mut(&route.script) {
                        ctx.enqueue_callback(route.callback);
                    }
                }
            }
            HostEvent::GumpClosed { gump } => {
                self.close_gump(gump, false);
            }
            HostEvent::ActionCompleted { action, outcome } => {
                self.complete_action(action, outcome);
            }
            HostEvent::PlayerUpdated { .. }
            | HostEvent::ItemUpdated { .. }
            | HostEvent::MobileUpdated { .. }
            | HostEvent::ObjectRemoved { .. }
            | HostEvent::ItemHoldChanged { .. } => {}
        }
    }

    fn complete_action(&mut self, action: moongate_events::ActionId, outcome: ActionOutcome) {
        let waiter = self.contexts.values_mut().find(|ctx| {
            matches!(&ctx.wait, Some(w) if matches!(w.awaited, Awaited::Action(id) if id == action))
        });

        match (waiter, &outcome) {
            (Some(ctx), _) => ctx.resolve(WaitOutcome::Action(outcome)),
            (None, ActionOutcome::Failed { reason }) => {
                warn!(target: "scripting", "Host failed action {:?}: {}", action, reason);
            }
            (None, ActionOutcome::Ok) => {}
        }
    }

    pub(crate) fn apply_broker_events(&mut self, events: Vec<BrokerEvent>) {
        for event in events {
            match event {
                BrokerEvent::Armed {
                    script,
                    session,
                    kind,
                } => {
                    self.sink
                        .send(Some(script), HostAction::ArmTargetCursor { session, kind });
                }
                BrokerEvent::Disarmed { session } => {
                    self.sink.send(None, HostAction::CancelTargetCursor { session });
                }
                BrokerEvent::Resolved {
                    script,
                    request,
                    resolution,
                } => {
                    let Some(ctx) = self.contexts.get_mut(&script) else {
                        continue;
                    };
                    let waiting = matches!(
                        &ctx.wait,
                        Some(w) if matches!(w.awaited, Awaited::Target(id) if id == request)
                    );
                    if waiting {
                        let result = match resolution {
                            TargetResolution::Fulfilled(result) => Some(result),
                            TargetResolution::TimedOut | TargetResolution::Canceled => None,
                        };
                        ctx.resolve(WaitOutcome::Target(result));
                    }
                }
            }
        }
    }

    pub(crate) fn expire_targets(&mut self) {
        let mut events = Vec::new();
        self.broker.expire(self.now, &mut events);
        self.apply_broker_events(events);
    }

    /// Resume parked scripts whose condition now holds or whose deadline lapsed
    pub(crate) fn resolve_waits(&mut self) {
        let EngineState {
            now,
            contexts,
            journal,
            broker,
            gumps,
            ..
        } = self;

        for ctx in contexts.values_mut() {
            let Some(wait) = &ctx.wait else {
                continue;
            };

            let satisfied = match &wait.awaited {
                // Predicates were already checked by the scheduler this tick
                Awaited::Pause | Awaited::Target(_) | Awaited::Action(_) | Awaited::Predicate(_) => {
                    false
                }
                Awaited::ServerCursor(filter) => broker.server_cursor(*filter).is_some(),
                Awaited::ServerGump(id) => gumps.server_gump(*id).is_some(),
                Awaited::Journal(patterns) => journal.matches_any(ctx.journal_cursor, patterns),
            };

            let outcome = if satisfied {
                Some(WaitOutcome::Ready)
            } else if wait.deadline.is_some_and(|d| *now >= d) {
                match wait.awaited {
                    Awaited::Pause => Some(WaitOutcome::Ready),
                    _ => Some(WaitOutcome::TimedOut),
                }
            } else {
                None
            };

            if let Some(outcome) = outcome {
                ctx.resolve(outcome);
            }
        }
    }

    /// Scripts parked on a world predicate, with a handle to the predicate
    pub(crate) fn parked_predicates(&self) -> Vec<(ScriptId, Rc<dyn Fn(&WorldView) -> bool>)> {
        self.contexts
            .iter()
            .filter_map(|(id, ctx)| match ctx.wait.as_ref().map(|w| &w.awaited) {
                Some(Awaited::Predicate(predicate)) => Some((*id, predicate.clone())),
                _ => None,
            })
            .collect()
    }

    /// Send at most one queued relocation, taking script queues in turn
    pub(crate) fn drain_moves(&mut self) {
        if self.world.item_hold() || !self.pacer.ready(self.now) {
            return;
        }

        let mut order: Vec<ScriptId> = self.contexts.keys().copied().collect();
        if let Some(last) = self.move_turn {
            let split = order.partition_point(|id| *id <= last);
            order.rotate_left(split);
        }

        for script in order {
            while let Some(request) = self
                .contexts
                .get_mut(&script)
                .and_then(|ctx| ctx.moves.pop())
            {
                match self.check_move(&request) {
                    Ok(()) => {
                        self.sink.send(Some(script), request.to_action());
                        self.pacer.mark(self.now);
                        self.move_turn = Some(script);
                        return;
                    }
                    Err(reason) => {
                        warn!(target: "scripting",
                            "Dropping queued move of {} for {}: {}",
                            request.serial,
                            script,
                            reason
                        );
                    }
                }
            }
        }
    }

    /// Whether the host could carry out `request` right now
    pub(crate) fn check_move(&self, request: &MoveRequest) -> Result<(), &'static str> {
        if self.world.item(request.serial).is_none() {
            return Err("item no longer exists");
        }
        match request.destination {
            MoveDestination::Container { serial } if !self.world.exists(serial) => {
                Err("destination container not found")
            }
            MoveDestination::Ground { .. } if request.position.is_none() => {
                Err("ground drop without a location")
            }
            _ => Ok(()),
        }
    }

    /// Close a script gump; `notify_host` when the engine initiated it
    pub(crate) fn close_gump(&mut self, gump: GumpId, notify_host: bool) -> bool {
        let Some(closed) = self.gumps.close(gump) else {
            return false;
        };

        if notify_host && closed.gump.visible {
            self.sink
                .send(Some(closed.gump.owner), HostAction::CloseGump { gump });
        }

        let mut dead: HashMap<ScriptId, Vec<CallbackId>> = HashMap::new();
        for route in &closed.dead_clicks {
            dead.entry(route.script).or_default().push(route.callback);
        }
        for (script, callbacks) in dead {
            if let Some(ctx) = self.contexts.get_mut(&script) {
                ctx.drop_gump_callbacks(gump, &callbacks);
            }
        }

        for route in closed.on_closed {
            if let Some(ctx) = self.contexts.get_mut(&route.script) {
                ctx.enqueue_callback(route.callback);
            }
        }

        debug!(target: "scripting", "Closed gump {:?}", gump);
        true
    }

    /// Tear down everything `script` holds and hand back its context.
    ///
    /// The cursor goes to the next queued requester before this returns.
    pub(crate) fn release(&mut self, script: ScriptId) -> Option<ScriptContext> {
        let mut events = Vec::new();
        if self.broker.cancel_for(script, self.now, &mut events) {
            debug!(target: "scripting", "Canceled target request of {}", script);
        }
        self.apply_broker_events(events);

        for gump in self.gumps.owned_by(script, false) {
            self.close_gump(gump, true);
        }
        self.gumps.forget_routes_of(script);

        let mut ctx = self.contexts.remove(&script)?;
        ctx.state = ScriptState::Stopped;
        if !ctx.moves.is_empty() {
            debug!(target: "scripting", "Dropping {} queued move(s) of {}", ctx.moves.len(), script);
        }
        Some(ctx)
    }
}
