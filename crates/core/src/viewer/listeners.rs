use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Kinds of global listeners an open viewer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerKind {
    /// Document-level key handler (Escape, +, -, 0).
    KeyDown,
    /// Document-level pointer release, so drags end outside the image.
    PointerUp,
    /// Non-passive wheel handler on the overlay container.
    Wheel,
}

/// Registry of active listeners, shared between a host and its viewers.
///
/// Registration hands out a [`ListenerHandle`]; dropping the handle
/// deregisters it. Counts are per kind so a leak shows up as a count above
/// the number of open viewers.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    active: Rc<RefCell<BTreeMap<ListenerKind, usize>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, kind: ListenerKind) -> ListenerHandle {
        *self.active.borrow_mut().entry(kind).or_insert(0) += 1;
        ListenerHandle { kind, active: Rc::clone(&self.active) }
    }

    /// Number of live registrations of the given kind.
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.active.borrow().get(&kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().values().all(|&n| n == 0)
    }
}

/// RAII registration; deregisters on drop.
#[derive(Debug)]
pub struct ListenerHandle {
    kind: ListenerKind,
    active: Rc<RefCell<BTreeMap<ListenerKind, usize>>>,
}

impl ListenerHandle {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if let Some(n) = active.get_mut(&self.kind) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                active.remove(&self.kind);
            }
        }
    }
}
