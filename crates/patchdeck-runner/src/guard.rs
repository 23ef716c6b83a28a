//! Single-slot guard that keeps at most one patch job in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared handle to the job slot. Clones observe the same slot.
#[derive(Debug, Clone, Default)]
pub struct JobGuard {
    busy: Arc<AtomicBool>,
}

impl JobGuard {
    /// Guard with the slot free.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` while another permit is alive.
    #[must_use]
    pub fn try_acquire(&self) -> Option<JobPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| JobPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    /// Whether a job currently holds the slot.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Proof of holding the job slot; dropping it frees the slot.
#[derive(Debug)]
#[must_use = "the job slot is released as soon as the permit is dropped"]
pub struct JobPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for JobPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
