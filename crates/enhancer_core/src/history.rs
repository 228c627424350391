use std::collections::VecDeque;

use crate::Metadata;

pub const HISTORY_CAPACITY: usize = 10;

/// Replayable snapshot of a completed job.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub filename: String,
    pub timestamp: String,
    pub video_url: Option<String>,
    pub metadata: Metadata,
}

/// Most-recent-first list of completed jobs, bounded at [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryCache {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `entry`, dropping the oldest entry once over capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn select(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
