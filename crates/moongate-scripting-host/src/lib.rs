/// Script execution engine for the moongate client
///
/// Scripts are async bodies that look synchronous to their authors: they
/// call `ScriptApi` methods such as `pause`, `request_target` or
/// `reply_gump` and the scheduler parks them until the host reports what
/// they wait for. Everything runs on the host's driver thread, one tick at
/// a time.
use std::future::Future;
use std::pin::Pin;

pub mod actions;
pub mod api;
pub mod context;
pub mod error;
pub mod gump;
pub mod ignore;
pub mod journal;
pub mod move_queue;
pub mod registry;
pub mod script_runner;
pub mod state;
mod suspend;
pub mod target;
pub mod vars;
pub mod world;

// Re-export commonly used types for script authors
pub use api::{DEFAULT_CORPSE_DISTANCE, DEFAULT_SCAN_DISTANCE, DEFAULT_SYSTEM_HUE, ScriptApi};
pub use context::{ScriptContext, ScriptState};
pub use error::{LaunchError, PersistError, ScriptError, ScriptResult};
pub use gump::controls;
pub use journal::{JournalStore, TextPattern};
pub use move_queue::MoveRequest;
pub use registry::{ScriptLibrary, create_runner_from_config};
pub use script_runner::ScriptRunner;
pub use vars::VarScope;
pub use world::{ItemQuery, WorldView};

/// A script body in flight
pub type ScriptFuture = Pin<Box<dyn Future<Output = ScriptResult>>>;

/// Something the scheduler can launch by name
pub trait Script {
    /// Unique name scripts and config refer to (e.g., "guard_caller")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Start a fresh run; called on every launch
    fn run(&self, api: ScriptApi) -> ScriptFuture;
}

/// A script made from a closure returning its body
pub struct FnScript<F> {
    name: String,
    description: String,
    body: F,
}

impl<F> FnScript<F> {
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Wrap `body` as a script named `name`
///
/// ```ignore
/// let script = script_fn("hello", |api| async move {
///     api.sys_msg("hello");
///     Ok(())
/// });
/// ```
pub fn script_fn<F, Fut>(name: impl Into<String>, body: F) -> FnScript<F>
where
    F: Fn(ScriptApi) -> Fut,
    Fut: Future<Output = ScriptResult> + 'static,
{
    FnScript {
        name: name.into(),
        description: String::new(),
        body,
    }
}

impl<F, Fut> Script for FnScript<F>
where
    F: Fn(ScriptApi) -> Fut,
    Fut: Future<Output = ScriptResult> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, api: ScriptApi) -> ScriptFuture {
        Box::pin((self.body)(api))
    }
}
