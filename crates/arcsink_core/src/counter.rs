//! Process-wide segment ordinal allocation.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// A monotonically increasing segment ordinal source.
///
/// Every [`ArchiveWriter`](crate::ArchiveWriter) sharing one counter
/// receives globally unique ordinals, which is what keeps segment file
/// names collision-free when many writers in one process open segments
/// concurrently. Allocation is a single atomic fetch-and-increment.
///
/// Writers normally share the [`global`](RotationCounter::global)
/// counter; tests inject a fresh one to get deterministic ordinals.
#[derive(Debug, Default)]
pub struct RotationCounter {
    next: AtomicU32,
}

impl RotationCounter {
    /// Creates a counter that allocates ordinals from zero.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a counter that allocates ordinals from `ordinal`.
    #[must_use]
    pub const fn starting_at(ordinal: u32) -> Self {
        Self {
            next: AtomicU32::new(ordinal),
        }
    }

    /// Returns the process-wide shared counter.
    ///
    /// All writers constructed with [`ArchiveWriter::new`] draw from
    /// this counter, so their segment ordinals never collide.
    ///
    /// [`ArchiveWriter::new`]: crate::ArchiveWriter::new
    #[must_use]
    pub fn global() -> Arc<RotationCounter> {
        static GLOBAL: OnceLock<Arc<RotationCounter>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RotationCounter::new())))
    }

    /// Allocates the next ordinal.
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the ordinal the next allocation will yield.
    #[must_use]
    pub fn peek(&self) -> u32 {
        self.next.load(Ordering::SeqCst)
    }
}
