//! Shared journal of game text with independent per-script read cursors.
//!
//! The store is append-only from a reader's point of view: readers hold a
//! [`JournalCursor`] (the sequence number of the first entry they have not
//! yet cleared) and never mutate entries. Old entries fall off the front once
//! the configured capacity is exceeded.

use std::collections::VecDeque;
use std::time::Instant;

use regex::Regex;
use tracing::warn;

/// Prefix that turns a journal or gump text pattern into a regular expression
pub const REGEX_MARKER: char = '$';

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub seq: u64,
    pub text: String,
    pub source: String,
    pub at: Instant,
}

/// Position in the journal from which a script reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct JournalCursor(pub u64);

#[derive(Debug, Clone)]
pub enum TextPattern {
    Substring(String),
    Regex(Regex),
}

impl TextPattern {
    /// Plain case-sensitive substring, or a regex when prefixed with `$`.
    ///
    /// An invalid regex falls back to a literal search for the text after
    /// the marker.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_prefix(REGEX_MARKER) {
            Some(expr) => match Regex::new(expr) {
                Ok(re) => TextPattern::Regex(re),
                Err(e) => {
                    warn!(target: "scripting", "Invalid pattern '{}': {}", expr, e);
                    TextPattern::Substring(expr.to_string())
                }
            },
            None => TextPattern::Substring(pattern.to_string()),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            TextPattern::Substring(needle) => text.contains(needle.as_str()),
            TextPattern::Regex(re) => re.is_match(text),
        }
    }
}

pub struct JournalStore {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
    next_seq: u64,
}

impl JournalStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn append(&mut self, text: impl Into<String>, source: impl Into<String>, at: Instant) {
        let entry = JournalEntry {
            seq: self.next_seq,
            text: text.into(),
            source: source.into(),
            at,
        };
        self.next_seq += 1;

        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Cursor positioned after every entry appended so far
    pub fn cursor_now(&self) -> JournalCursor {
        JournalCursor(self.next_seq)
    }

    /// Entries visible from `cursor`, oldest first
    pub fn since(&self, cursor: JournalCursor) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.seq >= cursor.0)
    }

    pub fn matches(&self, cursor: JournalCursor, pattern: &TextPattern) -> bool {
        self.since(cursor).any(|e| pattern.is_match(&e.text))
    }

    pub fn matches_any(&self, cursor: JournalCursor, patterns: &[TextPattern]) -> bool {
        self.since(cursor)
            .any(|e| patterns.iter().any(|p| p.is_match(&e.text)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(lines: &[&str]) -> JournalStore {
        let mut store = JournalStore::new(10);
        let now = Instant::now();
        for line in lines {
            store.append(*line, "system", now);
        }
        store
    }

    #[test]
    fn test_substring_is_case_sensitive() {
        let store = store_with(&["You catch a fish"]);
        let start = JournalCursor(0);
        assert!(store.matches(start, &TextPattern::parse("catch a")));
        assert!(!store.matches(start, &TextPattern::parse("Catch a")));
    }

    #[test]
    fn test_regex_marker() {
        let store = store_with(&["You have 150 gold"]);
        let start = JournalCursor(0);
        assert!(store.matches(start, &TextPattern::parse(r"$\d+ gold")));
        assert!(!store.matches(start, &TextPattern::parse(r"\d+ gold")));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_literal() {
        let store = store_with(&["odd (text"]);
        assert!(store.matches(JournalCursor(0), &TextPattern::parse("$(text")));
    }

    #[test]
    fn test_cursor_hides_older_entries() {
        let mut store = store_with(&["first"]);
        let cursor = store.cursor_now();
        assert!(!store.matches(cursor, &TextPattern::parse("first")));

        store.append("second", "system", Instant::now());
        assert!(store.matches(cursor, &TextPattern::parse("second")));
        assert!(store.matches(JournalCursor(0), &TextPattern::parse("first")));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut store = JournalStore::new(2);
        let now = Instant::now();
        store.append("a", "system", now);
        store.append("b", "system", now);
        store.append("c", "system", now);

        assert_eq!(store.len(), 2);
        assert!(!store.matches(JournalCursor(0), &TextPattern::parse("a")));
        assert!(store.matches_any(
            JournalCursor(0),
            &[TextPattern::parse("x"), TextPattern::parse("c")]
        ));
    }
}
