//! The active-dictionary pointer.

use std::sync::atomic::{AtomicI64, Ordering};

/// Which dictionary searches, suggestions and ledgers are scoped to.
///
/// Lives for the manager's lifetime; never persisted. Dictionary ids are
/// positive, so 0 stores "none".
#[derive(Debug, Default)]
pub struct Session {
    active: AtomicI64,
}

impl Session {
    #[must_use]
    pub const fn new() -> Self {
        Self { active: AtomicI64::new(0) }
    }

    /// Current active dictionary id.
    #[must_use]
    pub fn active(&self) -> Option<i64> {
        match self.active.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn set(&self, id: Option<i64>) {
        self.active.store(id.unwrap_or(0), Ordering::Release);
    }

    /// Unset only if `id` is the active dictionary. Returns true if it was.
    pub fn clear_if(&self, id: i64) -> bool {
        self.active.compare_exchange(id, 0, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }
}
