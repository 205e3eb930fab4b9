//! Allocation of session-local annotation ids.

use std::collections::BTreeSet;

use crate::model::InternalId;

/// Hands out internal ids: the smallest non-negative integer never used in
/// this session.
///
/// Released ids stay reserved. History snapshots keep referring to deleted
/// annotations by id, and undo diffs match annotations by id, so a recycled
/// id would make an unrelated annotation look "changed" after time travel.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    used: BTreeSet<InternalId>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve and return the next free id.
    pub fn allocate(&mut self) -> InternalId {
        let mut id = 0;
        for &used in &self.used {
            if used != id {
                break;
            }
            id += 1;
        }
        self.used.insert(id);
        log::trace!("Allocated internal id {}", id);
        id
    }

    /// Mark an id as no longer referenced by the live list.
    pub fn release(&mut self, id: InternalId) {
        log::trace!("Internal id {} released, kept reserved", id);
    }

    /// Reserve an id that entered the session from elsewhere.
    pub fn mark_used(&mut self, id: InternalId) {
        self.used.insert(id);
    }

    pub fn is_used(&self, id: InternalId) -> bool {
        self.used.contains(&id)
    }
}
