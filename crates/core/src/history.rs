use serde::{Deserialize, Serialize};

/// Maximum number of persisted entries; the oldest is dropped first.
pub const HISTORY_CAPACITY: usize = 10;

/// One reviewed suggestion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub request: String,
    pub command: String,
    pub executed: bool,
}

/// Bounded list of recent entries, oldest first.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct CommandHistory {
    entries: Vec<HistoryEntry>,
}

impl CommandHistory {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self { entries };
        history.trim();
        history
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        self.trim();
    }

    fn trim(&mut self) {
        if self.entries.len() > HISTORY_CAPACITY {
            let excess = self.entries.len() - HISTORY_CAPACITY;
            self.entries.drain(..excess);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> &[HistoryEntry] {
        &self.entries[self.entries.len().saturating_sub(count)..]
    }

    /// Command texts, oldest first, for editor history browsing.
    pub fn commands(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.command.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
