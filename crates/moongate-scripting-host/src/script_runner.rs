use std::any::Any;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Instant;

use moongate_config::EngineConfig;
use moongate_events::{EngineOutput, HostEvent, ScriptEvent, ScriptEventType, ScriptId};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use super::ScriptFuture;
use crate::api::ScriptApi;
use crate::context::{ScriptContext, ScriptState, WaitOutcome};
use crate::error::{LaunchError, ScriptError};
use crate::registry::ScriptLibrary;
use crate::state::{EngineState, LifecycleCommand};
use crate::vars::PersistentVars;

struct RunningScript {
    id: ScriptId,
    name: String,
    future: ScriptFuture,
}

/// Cooperative scheduler: polls every running script once per tick
pub struct ScriptRunner {
    state: Rc<RefCell<EngineState>>,
    library: ScriptLibrary,
    /// Launch order, which is also poll order
    running: Vec<RunningScript>,
    /// Host events waiting for the next tick
    inbox: VecDeque<HostEvent>,
    next_id: u64,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

impl ScriptRunner {
    pub fn new(output_tx: UnboundedSender<EngineOutput>, config: EngineConfig) -> Self {
        let path = config.persistent_vars_path();
        let persistent = match PersistentVars::load(&path, config.profile.clone()) {
            Ok(vars) => vars,
            Err(e) => {
                warn!(target: "scripting", "Starting with empty persistent variables: {}", e);
                PersistentVars::empty(&path, config.profile.clone())
            }
        };

        Self {
            state: Rc::new(RefCell::new(EngineState::new(
                config,
                output_tx,
                persistent,
                Instant::now(),
            ))),
            library: ScriptLibrary::new(),
            running: Vec::new(),
            inbox: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn set_library(&mut self, library: ScriptLibrary) {
        self.library = library;
    }

    pub fn library(&self) -> &ScriptLibrary {
        &self.library
    }

    pub fn register(&mut self, script: impl super::Script + 'static) {
        self.library.register(script);
    }

    /// Start a registered script; a script already running is left alone
    pub fn launch(&mut self, name: &str) -> Result<ScriptId, LaunchError> {
        if let Some(running) = self.running.iter().find(|r| r.name == name) {
            debug!(target: "scripting", "Script {} is already running as {}", name, running.id);
            return Ok(running.id);
        }

        let script = self
            .library
            .get(name)
            .ok_or_else(|| LaunchError::UnknownScript(name.to_string()))?;

        let id = ScriptId(self.next_id);
        self.next_id += 1;

        {
            let mut state = self.state.borrow_mut();
            let ctx = ScriptContext::new(
                id,
                name,
                state.journal.cursor_now(),
                state.config.callback_limit,
                state.config.script_config.get(name).cloned(),
            );
            state.contexts.insert(id, ctx);
        }

        let api = ScriptApi::new(self.state.clone(), id);
        let future = match catch_unwind(AssertUnwindSafe(|| script.run(api))) {
            Ok(future) => future,
            Err(panic) => {
                error!(target: "scripting",
                    "Script {} ({}) panicked while starting: {}",
                    name,
                    id,
                    panic_message(panic.as_ref())
                );
                let ctx = self.state.borrow_mut().release(id);
                drop(ctx);
                return Err(LaunchError::StartPanicked(name.to_string()));
            }
        };

        self.running.push(RunningScript {
            id,
            name: name.to_string(),
            future,
        });

        info!(target: "scripting", "Launched script {} ({})", name, id);
        self.report(id, name, ScriptEventType::Started);
        Ok(id)
    }

    /// Stop a script now, releasing everything it holds
    pub fn stop(&mut self, id: ScriptId) -> bool {
        self.finish(id, ScriptEventType::Stopped)
    }

    pub fn stop_by_name(&mut self, name: &str) -> bool {
        match self.script_id(name) {
            Some(id) => self.stop(id),
            None => false,
        }
    }

    /// Stop the script if it runs, launch it otherwise; true when it is now running
    pub fn toggle(&mut self, name: &str) -> Result<bool, LaunchError> {
        if self.stop_by_name(name) {
            return Ok(false);
        }
        self.launch(name).map(|_| true)
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.script_id(name).is_some()
    }

    pub fn script_id(&self, name: &str) -> Option<ScriptId> {
        self.running.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// State of a script launched by this runner; `Stopped` once it has ended
    pub fn script_state(&self, id: ScriptId) -> Option<ScriptState> {
        if let Some(ctx) = self.state.borrow().contexts.get(&id) {
            return Some(ctx.state());
        }
        (1..self.next_id)
            .contains(&id.0)
            .then_some(ScriptState::Stopped)
    }

    /// Running scripts in launch order
    pub fn running_scripts(&self) -> Vec<(ScriptId, String)> {
        self.running
            .iter()
            .map(|r| (r.id, r.name.clone()))
            .collect()
    }

    /// Queue a host event; it is applied at the start of the next tick
    pub fn handle_event(&mut self, event: HostEvent) {
        self.inbox.push_back(event);
    }

    /// Advance the engine by one tick
    pub fn tick(&mut self, now: Instant) {
        {
            let mut state = self.state.borrow_mut();
            state.now = state.now.max(now);

            while let Some(event) = self.inbox.pop_front() {
                state.apply_event(event);
            }

            state.expire_targets();
        }

        self.resolve_predicates();

        {
            let mut state = self.state.borrow_mut();
            state.resolve_waits();
            state.drain_moves();
        }

        self.poll_scripts();

        let mut state = self.state.borrow_mut();
        let now = state.now;
        state.persistent.flush_logged(now);
    }

    /// Check `wait_until` conditions against a snapshot of the world.
    ///
    /// A predicate is script code: it may call back into the API, so no
    /// engine borrow is held while it runs, and a panic faults only its script.
    fn resolve_predicates(&mut self) {
        let parked = self.state.borrow().parked_predicates();
        if parked.is_empty() {
            return;
        }
        let world = self.state.borrow().world.clone();

        for (id, predicate) in parked {
            match catch_unwind(AssertUnwindSafe(|| predicate(&world))) {
                Ok(true) => {
                    let mut state = self.state.borrow_mut();
                    if let Some(ctx) = state.contexts.get_mut(&id).filter(|ctx| ctx.is_parked()) {
                        ctx.resolve(WaitOutcome::Ready);
                    }
                }
                Ok(false) => {}
                Err(panic) => {
                    drop(predicate);
                    self.finish(id, ScriptEventType::Faulted {
                        message: format!("panicked: {}", panic_message(panic.as_ref())),
                    });
                }
            }
        }
    }

    fn poll_scripts(&mut self) {
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);

        // Scripts launched during this tick first run on the next one
        let ids: Vec<ScriptId> = self.running.iter().map(|r| r.id).collect();

        for id in ids {
            let Some(index) = self.running.iter().position(|r| r.id == id) else {
                continue;
            };

            let runnable = self
                .state
                .borrow()
                .contexts
                .get(&id)
                .is_some_and(|ctx| ctx.state() == ScriptState::Running && !ctx.is_parked());
            if !runnable {
                continue;
            }

            let script = &mut self.running[index];
            let poll = catch_unwind(AssertUnwindSafe(|| script.future.as_mut().poll(&mut cx)));

            let finished = match poll {
                Ok(Poll::Pending) => None,
                Ok(Poll::Ready(Ok(()))) | Ok(Poll::Ready(Err(ScriptError::Stopped))) => {
                    Some(ScriptEventType::Stopped)
                }
                Ok(Poll::Ready(Err(e))) => Some(ScriptEventType::Faulted {
                    message: e.to_string(),
                }),
                Err(panic) => Some(ScriptEventType::Faulted {
                    message: format!("panicked: {}", panic_message(panic.as_ref())),
                }),
            };

            let stop_requested = self
                .state
                .borrow()
                .contexts
                .get(&id)
                .is_some_and(|ctx| ctx.stop_requested);

            match finished {
                Some(event_type) => {
                    self.finish(id, event_type);
                }
                None if stop_requested => {
                    self.finish(id, ScriptEventType::Stopped);
                }
                None => {}
            }

            self.run_lifecycle_commands();
        }
    }

    fn run_lifecycle_commands(&mut self) {
        let commands = std::mem::take(&mut self.state.borrow_mut().lifecycle);

        for command in commands {
            let result = match &command {
                LifecycleCommand::Play(name) => self.launch(name).map(|_| ()),
                LifecycleCommand::Stop(name) => {
                    self.stop_by_name(name);
                    Ok(())
                }
                LifecycleCommand::Toggle(name) => self.toggle(name).map(|_| ()),
            };
            if let Err(e) = result {
                warn!(target: "scripting", "Lifecycle command {:?} failed: {}", command, e);
            }
        }
    }

    /// Remove a script, release its resources and report how it ended
    fn finish(&mut self, id: ScriptId, event_type: ScriptEventType) -> bool {
        let Some(index) = self.running.iter().position(|r| r.id == id) else {
            return false;
        };
        let script = self.running.remove(index);

        let ctx = self.state.borrow_mut().release(id);
        // Futures and callbacks hold engine handles; drop them with no borrow active
        drop(script.future);
        drop(ctx);

        match &event_type {
            ScriptEventType::Faulted { message } => {
                error!(target: "scripting", "Script {} ({}) faulted: {}", script.name, id, message);
            }
            _ => {
                info!(target: "scripting", "Script {} ({}) stopped", script.name, id);
            }
        }

        self.report(id, &script.name, event_type);
        true
    }

    fn report(&self, id: ScriptId, name: &str, event_type: ScriptEventType) {
        self.state
            .borrow()
            .sink
            .report(ScriptEvent::new(id, name, event_type));
    }

    /// Stop every script and save persistent variables
    pub fn shutdown(&mut self) {
        let ids: Vec<ScriptId> = self.running.iter().map(|r| r.id).collect();
        if !ids.is_empty() {
            debug!(target: "scripting", "Stopping {} script(s)", ids.len());
        }
        for id in ids {
            self.finish(id, ScriptEventType::Stopped);
        }
        if let Err(e) = self.state.borrow_mut().persistent.flush() {
            warn!(target: "scripting", "Could not save persistent variables: {}", e);
        }
    }
}

impl Drop for ScriptRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
