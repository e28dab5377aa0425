use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use moongate_events::ScriptId;

use crate::context::{Wait, WaitOutcome};
use crate::state::EngineState;

/// Parks a script on its first poll and completes once the scheduler resolves it.
///
/// The scheduler skips parked contexts, so this is only polled again after
/// an outcome has been stored.
pub(crate) struct Suspend {
    state: Rc<RefCell<EngineState>>,
    script: ScriptId,
    wait: Option<Wait>,
}

impl Suspend {
    pub(crate) fn new(state: Rc<RefCell<EngineState>>, script: ScriptId, wait: Wait) -> Self {
        Self {
            state,
            script,
            wait: Some(wait),
        }
    }
}

impl Future for Suspend {
    type Output = WaitOutcome;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<WaitOutcome> {
        let this = self.get_mut();
        let mut state = this.state.borrow_mut();
        let Some(ctx) = state.contexts.get_mut(&this.script) else {
            return Poll::Pending;
        };

        if let Some(wait) = this.wait.take() {
            ctx.park(wait);
            return Poll::Pending;
        }

        match ctx.outcome.take() {
            Some(outcome) => Poll::Ready(outcome),
            None => Poll::Pending,
        }
    }
}
