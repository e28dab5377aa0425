use std::collections::HashSet;

use moongate_events::Serial;

/// Objects one script has asked entity scans to skip
#[derive(Debug, Default, Clone)]
pub struct IgnoreSet {
    serials: HashSet<Serial>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore(&mut self, serial: Serial) {
        self.serials.insert(serial);
    }

    pub fn clear(&mut self) {
        self.serials.clear();
    }

    pub fn contains(&self, serial: Serial) -> bool {
        self.serials.contains(&serial)
    }

    pub fn len(&self) -> usize {
        self.serials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.serials.is_empty()
    }
}
