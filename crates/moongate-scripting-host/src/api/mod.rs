//! The calls a script makes into the engine.
//!
//! Every method borrows the engine state only for the duration of the call.
//! Methods returning futures park the script until the scheduler resolves
//! them; none of them fail with an error, a miss or timeout is `false` or
//! `None`.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};

use moongate_events::{HostAction, Hue, ScriptId, Serial, SpeechChannel};
use tracing::{debug, warn};

use crate::context::{Awaited, ScriptContext, Wait, WaitOutcome};
use crate::error::{ScriptError, ScriptResult};
use crate::state::{EngineState, LifecycleCommand};
use crate::suspend::Suspend;
use crate::world::WorldView;

mod entities;
mod gumps;
mod items;
mod journal;
mod scan;
mod targeting;
mod vars;

pub use scan::{DEFAULT_CORPSE_DISTANCE, DEFAULT_SCAN_DISTANCE};

/// Hue used by `sys_msg` when none is given
pub const DEFAULT_SYSTEM_HUE: Hue = 946;

/// Handle a script uses to talk to the engine; cheap to clone into callbacks
#[derive(Clone)]
pub struct ScriptApi {
    state: Rc<RefCell<EngineState>>,
    id: ScriptId,
}

impl ScriptApi {
    pub(crate) fn new(state: Rc<RefCell<EngineState>>, id: ScriptId) -> Self {
        Self { state, id }
    }

    fn engine(&self) -> RefMut<'_, EngineState> {
        self.state.borrow_mut()
    }

    fn with_context<R>(&self, f: impl FnOnce(&mut ScriptContext) -> R) -> Option<R> {
        let mut state = self.state.borrow_mut();
        state.contexts.get_mut(&self.id).map(f)
    }

    fn suspend(&self, awaited: Awaited, deadline: Option<Instant>) -> Suspend {
        Suspend::new(self.state.clone(), self.id, Wait { awaited, deadline })
    }

    fn deadline_after(&self, timeout: Duration) -> Instant {
        self.engine().now + timeout
    }

    /// Issue an action without waiting for the host
    fn send(&self, action: HostAction) {
        self.engine().send(self.id, action);
    }

    /// Issue an action and wait until the host confirms it or `action_timeout` lapses
    async fn send_confirmed(&self, action: HostAction) -> bool {
        let (action_id, deadline) = {
            let mut state = self.engine();
            let deadline = state.now + state.config.action_timeout();
            (state.send(self.id, action), deadline)
        };

        match self.suspend(Awaited::Action(action_id), Some(deadline)).await {
            WaitOutcome::Action(outcome) => outcome.is_ok(),
            _ => {
                debug!(target: "scripting", "{} gave up waiting for {:?}", self.id, action_id);
                false
            }
        }
    }

    /// Warn and return false when `serial` is not a known world object
    fn known(&self, serial: Serial, call: &str) -> bool {
        if serial.is_valid() && self.engine().world.exists(serial) {
            return true;
        }
        warn!(target: "scripting", "{}: {} called with unknown object {}", self.script_name(), call, serial);
        false
    }

    // ===== Identity =====

    pub fn script_id(&self) -> ScriptId {
        self.id
    }

    pub fn script_name(&self) -> String {
        self.with_context(|ctx| ctx.name.clone()).unwrap_or_default()
    }

    /// This script's table from `engine.script_config`
    pub fn script_config(&self) -> Option<toml::Value> {
        self.with_context(|ctx| ctx.config.clone()).flatten()
    }

    /// Time of the tick currently being processed
    pub fn now(&self) -> Instant {
        self.engine().now
    }

    // ===== Messages =====

    fn speak(&self, channel: SpeechChannel, text: impl Into<String>) {
        self.send(HostAction::Say {
            channel,
            text: text.into(),
        });
    }

    pub fn msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Say, text);
    }

    pub fn party_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Party, text);
    }

    pub fn guild_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Guild, text);
    }

    pub fn ally_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Alliance, text);
    }

    pub fn whisper_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Whisper, text);
    }

    pub fn yell_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Yell, text);
    }

    pub fn emote_msg(&self, text: impl Into<String>) {
        self.speak(SpeechChannel::Emote, text);
    }

    /// Client-side message only the player sees
    pub fn sys_msg(&self, text: impl Into<String>) {
        self.sys_msg_hued(text, DEFAULT_SYSTEM_HUE);
    }

    pub fn sys_msg_hued(&self, text: impl Into<String>, hue: Hue) {
        self.send(HostAction::SystemMessage {
            text: text.into(),
            hue,
        });
    }

    /// Overhead text above `serial`
    pub fn head_msg(&self, text: impl Into<String>, serial: Serial, hue: Option<Hue>) {
        self.send(HostAction::HeadMessage {
            serial,
            text: text.into(),
            hue,
        });
    }

    /// Cooldown bar on the host; negative durations show as zero
    pub fn create_cooldown_bar(&self, seconds: f64, text: impl Into<String>, hue: Hue) {
        self.send(HostAction::ShowCooldownBar {
            seconds: seconds.max(0.0),
            text: text.into(),
            hue,
        });
    }

    // ===== Lifecycle =====

    /// Suspend this script for `duration`, clamped to `max_pause_secs`.
    ///
    /// A zero pause still yields until the next tick.
    pub async fn pause(&self, duration: Duration) {
        let deadline = {
            let state = self.engine();
            let max = Duration::from_secs_f64(state.config.max_pause_secs.max(0.0));
            state.now + duration.min(max)
        };
        self.suspend(Awaited::Pause, Some(deadline)).await;
    }

    /// Request termination; return the result from the script body
    ///
    /// ```ignore
    /// if done {
    ///     return api.stop();
    /// }
    /// ```
    pub fn stop(&self) -> ScriptResult {
        self.with_context(|ctx| ctx.stop_requested = true);
        Err(ScriptError::Stopped)
    }

    /// Launch a registered script by name after this poll
    pub fn play_script(&self, name: impl Into<String>) {
        self.engine().lifecycle.push(LifecycleCommand::Play(name.into()));
    }

    pub fn stop_script(&self, name: impl Into<String>) {
        self.engine().lifecycle.push(LifecycleCommand::Stop(name.into()));
    }

    pub fn toggle_script(&self, name: impl Into<String>) {
        self.engine().lifecycle.push(LifecycleCommand::Toggle(name.into()));
    }

    /// Wait until `predicate` holds over the world view; false on timeout
    pub async fn wait_until(
        &self,
        predicate: impl Fn(&WorldView) -> bool + 'static,
        timeout: Duration,
    ) -> bool {
        // The predicate may call back into this API
        let world = self.engine().world.clone();
        if predicate(&world) {
            return true;
        }
        let deadline = self.deadline_after(timeout);
        let outcome = self
            .suspend(Awaited::Predicate(Rc::new(predicate)), Some(deadline))
            .await;
        outcome == WaitOutcome::Ready
    }
}
