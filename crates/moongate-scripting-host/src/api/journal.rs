use std::time::Duration;

use super::ScriptApi;
use crate::context::{Awaited, WaitOutcome};
use crate::journal::TextPattern;

impl ScriptApi {
    /// A journal line since this script's cursor contains `pattern`.
    ///
    /// Patterns starting with `$` are regular expressions.
    pub fn in_journal(&self, pattern: &str) -> bool {
        self.in_journal_any(&[pattern])
    }

    pub fn in_journal_any(&self, patterns: &[&str]) -> bool {
        let patterns: Vec<TextPattern> = patterns.iter().map(|p| TextPattern::parse(p)).collect();
        let state = self.engine();
        state
            .contexts
            .get(&self.id)
            .is_some_and(|ctx| state.journal.matches_any(ctx.journal_cursor, &patterns))
    }

    /// Move this script's cursor to the newest line; other scripts are unaffected
    pub fn clear_journal(&self) {
        let mut state = self.engine();
        let cursor = state.journal.cursor_now();
        if let Some(ctx) = state.contexts.get_mut(&self.id) {
            ctx.journal_cursor = cursor;
        }
    }

    /// Wait until any of `patterns` appears in the journal
    pub async fn wait_for_journal(&self, patterns: &[&str], timeout: Duration) -> bool {
        if self.in_journal_any(patterns) {
            return true;
        }
        let patterns = patterns.iter().map(|p| TextPattern::parse(p)).collect();
        let deadline = self.deadline_after(timeout);
        let outcome = self.suspend(Awaited::Journal(patterns), Some(deadline)).await;
        outcome == WaitOutcome::Ready
    }
}
