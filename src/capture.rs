//! Scoped subscriptions to the global pointer-up signal.
//!
//! A drag must keep receiving pointer events after the cursor leaves the
//! small node hit area, so while a drag is active the editor holds a
//! [`PointerCapture`]. The subscription is released when the guard drops:
//! on drag end, on cancel, or when the editor itself is torn down.

use std::cell::Cell;
use std::rc::Rc;

/// Source of global pointer captures, owned by the canvas.
#[derive(Debug, Clone, Default)]
pub struct GlobalPointer {
    subscriptions: Rc<Cell<usize>>,
}

impl GlobalPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to global pointer events until the guard is dropped.
    pub fn capture(&self) -> PointerCapture {
        self.subscriptions.set(self.subscriptions.get() + 1);
        log::trace!("Global pointer captured ({} active)", self.subscriptions.get());
        PointerCapture {
            subscriptions: Rc::clone(&self.subscriptions),
        }
    }

    /// Whether any drag currently holds the global pointer.
    pub fn is_captured(&self) -> bool {
        self.subscriptions.get() > 0
    }

    pub fn active_captures(&self) -> usize {
        self.subscriptions.get()
    }
}

/// Guard for one global pointer subscription.
#[derive(Debug)]
pub struct PointerCapture {
    subscriptions: Rc<Cell<usize>>,
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        self.subscriptions.set(self.subscriptions.get().saturating_sub(1));
        log::trace!("Global pointer released ({} active)", self.subscriptions.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_released_on_drop() {
        let pointer = GlobalPointer::new();
        assert!(!pointer.is_captured());
        {
            let _guard = pointer.capture();
            assert!(pointer.is_captured());
            let _second = pointer.capture();
            assert_eq!(pointer.active_captures(), 2);
        }
        assert!(!pointer.is_captured());
    }
}
