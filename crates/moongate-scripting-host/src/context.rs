use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use moongate_events::{ActionId, ActionOutcome, CursorFilter, GumpId, ScriptId, ServerGumpId, TargetResult};
use tracing::warn;

use crate::api::ScriptApi;
use crate::ignore::IgnoreSet;
use crate::journal::{JournalCursor, TextPattern};
use crate::move_queue::MoveQueue;
use crate::target::TargetRequestId;
use crate::world::WorldView;

/// Lifecycle state of a script context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptState {
    Running,
    Paused,
    WaitingForTarget,
    WaitingForGump,
    WaitingForEvent,
    Stopped,
}

impl fmt::Display for ScriptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptState::Running => "running",
            ScriptState::Paused => "paused",
            ScriptState::WaitingForTarget => "waiting for target",
            ScriptState::WaitingForGump => "waiting for gump",
            ScriptState::WaitingForEvent => "waiting for event",
            ScriptState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(pub u64);

/// A gump callback; runs only inside `ScriptApi::process_callbacks`
pub type Callback = Box<dyn FnMut(&ScriptApi)>;

pub(crate) struct CallbackSlot {
    /// Taken out while the callback runs
    pub callback: Option<Callback>,
    pub gump: GumpId,
    /// Close callbacks run once and are then discarded
    pub once: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingCallback {
    pub callback: CallbackId,
    pub gump: GumpId,
}

/// What a parked script is waiting for
pub(crate) enum Awaited {
    Pause,
    Target(TargetRequestId),
    ServerCursor(CursorFilter),
    ServerGump(Option<ServerGumpId>),
    Journal(Vec<TextPattern>),
    /// Evaluated by the scheduler with no engine borrow held
    Predicate(Rc<dyn Fn(&WorldView) -> bool>),
    Action(ActionId),
}

impl Awaited {
    fn state(&self) -> ScriptState {
        match self {
            Awaited::Pause => ScriptState::Paused,
            Awaited::Target(_) | Awaited::ServerCursor(_) => ScriptState::WaitingForTarget,
            Awaited::ServerGump(_) => ScriptState::WaitingForGump,
            Awaited::Journal(_) | Awaited::Predicate(_) | Awaited::Action(_) => {
                ScriptState::WaitingForEvent
            }
        }
    }
}

pub(crate) struct Wait {
    pub awaited: Awaited,
    pub deadline: Option<Instant>,
}

/// Result handed back to a parked script when it resumes
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WaitOutcome {
    /// The awaited condition held, or a pause elapsed
    Ready,
    Target(Option<TargetResult>),
    Action(ActionOutcome),
    TimedOut,
}

/// Per-script state owned by the scheduler
pub struct ScriptContext {
    pub(crate) id: ScriptId,
    pub(crate) name: String,
    pub(crate) state: ScriptState,
    pub(crate) ignore: IgnoreSet,
    pub(crate) journal_cursor: JournalCursor,
    pub(crate) moves: MoveQueue,
    pub(crate) wait: Option<Wait>,
    pub(crate) outcome: Option<WaitOutcome>,
    pub(crate) stop_requested: bool,
    pub(crate) config: Option<toml::Value>,
    callbacks: HashMap<CallbackId, CallbackSlot>,
    pending: VecDeque<PendingCallback>,
    callback_limit: usize,
    next_callback: u64,
}

impl ScriptContext {
    pub(crate) fn new(
        id: ScriptId,
        name: impl Into<String>,
        journal_cursor: JournalCursor,
        callback_limit: usize,
        config: Option<toml::Value>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            state: ScriptState::Running,
            ignore: IgnoreSet::new(),
            journal_cursor,
            moves: MoveQueue::default(),
            wait: None,
            outcome: None,
            stop_requested: false,
            config,
            callbacks: HashMap::new(),
            pending: VecDeque::new(),
            callback_limit: callback_limit.max(1),
            next_callback: 0,
        }
    }

    pub fn id(&self) -> ScriptId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    pub(crate) fn park(&mut self, wait: Wait) {
        self.state = wait.awaited.state();
        self.outcome = None;
        self.wait = Some(wait);
    }

    /// Hand `outcome` to the parked script; it runs again on the next poll
    pub(crate) fn resolve(&mut self, outcome: WaitOutcome) {
        self.wait = None;
        self.outcome = Some(outcome);
        self.state = ScriptState::Running;
    }

    /// Parked and not yet resolved
    pub(crate) fn is_parked(&self) -> bool {
        self.wait.is_some()
    }

    pub(crate) fn add_callback(&mut self, callback: Callback, gump: GumpId, once: bool) -> CallbackId {
        let id = CallbackId(self.next_callback);
        self.next_callback += 1;
        self.callbacks.insert(
            id,
            CallbackSlot {
                callback: Some(callback),
                gump,
                once,
            },
        );
        id
    }

    /// Queue a callback for the next `process_callbacks`
    pub(crate) fn enqueue_callback(&mut self, callback: CallbackId) {
        let Some(slot) = self.callbacks.get(&callback) else {
            return;
        };

        if self.pending.len() >= self.callback_limit {
            if let Some(dropped) = self.pending.pop_front() {
                warn!(target: "scripting",
                    "Script {} ({}) has {} unprocessed callbacks, dropping oldest {:?}",
                    self.name,
                    self.id,
                    self.callback_limit,
                    dropped.callback
                );
            }
        }

        self.pending.push_back(PendingCallback {
            callback,
            gump: slot.gump,
        });
    }

    /// Forget click callbacks tied to a gump that no longer exists
    pub(crate) fn drop_gump_callbacks(&mut self, gump: GumpId, callbacks: &[CallbackId]) {
        for id in callbacks {
            self.callbacks.remove(id);
        }
        self.pending
            .retain(|p| p.gump != gump || !callbacks.contains(&p.callback));
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingCallback> {
        self.pending.pop_front()
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Borrow a callback out of its slot so it can run without holding the engine
    pub(crate) fn take_callback(&mut self, id: CallbackId) -> Option<(Callback, bool)> {
        let slot = self.callbacks.get_mut(&id)?;
        let once = slot.once;
        let callback = slot.callback.take()?;
        if once {
            self.callbacks.remove(&id);
        }
        Some((callback, once))
    }

    /// Return a callback after it ran, unless its gump went away meanwhile
    pub(crate) fn restore_callback(&mut self, id: CallbackId, callback: Callback) {
        if let Some(slot) = self.callbacks.get_mut(&id) {
            slot.callback = Some(callback);
        }
    }
}
