//! Snapshot history with a time-travel cursor.
//!
//! Every committed mutation pushes a full snapshot of the annotation list.
//! While the cursor is `None` the session sits at the newest snapshot (the
//! present); undo and redo move the cursor, and a push while travelling
//! discards the snapshots after it.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    cursor: Option<usize>,
    /// Oldest snapshots are dropped beyond this many; `None` keeps all
    max_entries: Option<usize>,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T: Clone> History<T> {
    pub fn new(max_entries: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            max_entries: max_entries.map(|max| max.max(1)),
        }
    }

    /// Record a new snapshot and return to the present.
    pub fn push(&mut self, snapshot: T) {
        if let Some(cursor) = self.cursor.take() {
            let dropped = self.entries.len() - (cursor + 1);
            self.entries.truncate(cursor + 1);
            log::debug!("📝 History: dropped {} redo entries", dropped);
        }
        self.entries.push_back(snapshot);
        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                self.entries.pop_front();
            }
        }
        log::debug!("📝 History: {} entries", self.entries.len());
    }

    /// Step back one snapshot. From the present this is the second newest.
    pub fn undo(&mut self) -> Option<&T> {
        let target = match self.cursor {
            None => self.entries.len().checked_sub(2)?,
            Some(0) => return None,
            Some(cursor) => cursor - 1,
        };
        self.cursor = Some(target);
        log::debug!("📝 Undo to {}/{}", target + 1, self.entries.len());
        self.entries.get(target)
    }

    /// Step forward one snapshot. Reaching the newest returns to the present.
    pub fn redo(&mut self) -> Option<&T> {
        let next = self.cursor? + 1;
        let last = self.entries.len().saturating_sub(1);
        self.cursor = if next >= last { None } else { Some(next) };
        log::debug!("📝 Redo to {}/{}", next + 1, self.entries.len());
        self.entries.get(next.min(last))
    }

    pub fn can_undo(&self) -> bool {
        match self.cursor {
            None => self.entries.len() >= 2,
            Some(cursor) => cursor > 0,
        }
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
