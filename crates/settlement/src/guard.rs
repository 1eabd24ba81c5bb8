use std::sync::atomic::{AtomicBool, Ordering};

use crate::SettlementError;

/// Rejects every entry into an engine while one of its settlements is running
///
/// External exchange code runs inside a settlement and may call back into the
/// engine directly or from a thread it spawns. Both look the same from here,
/// so any call arriving while the guard is held fails immediately instead of
/// waiting for a settlement that may in turn be waiting for it.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    active: AtomicBool,
}

/// Held for the duration of one settlement; releases the guard on drop
#[must_use = "the guard is released as soon as this value is dropped"]
pub struct Entered<'g> {
    guard: &'g ReentrancyGuard,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if a settlement is running on this engine
    pub fn check(&self) -> Result<(), SettlementError> {
        if self.active.load(Ordering::SeqCst) {
            return Err(SettlementError::Reentrant);
        }
        Ok(())
    }

    /// Mark a settlement as running
    pub fn enter(&self) -> Result<Entered<'_>, SettlementError> {
        self.active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| SettlementError::Reentrant)?;
        Ok(Entered { guard: self })
    }

    pub fn is_entered(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        self.guard.active.store(false, Ordering::SeqCst);
    }
}
