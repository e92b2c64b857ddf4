//! Synchronization primitives for ISR-safe access.
//!
//! Low-level primitives shared by the interrupt top half and the deferred
//! worker.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use critical_section::Mutex;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Execute a closure with immutable access.
    #[inline]
    pub fn with_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

impl<T: Default> Default for CriticalSectionCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> core::fmt::Debug for CriticalSectionCell<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CriticalSectionCell { .. }")
    }
}

/// Status bits accumulated from interrupt context and drained elsewhere.
///
/// [`merge`](Self::merge) never loses a bit set by a concurrent caller, and
/// [`take`](Self::take) hands every accumulated bit to exactly one drainer.
#[derive(Debug, Default)]
pub struct PendingBits {
    bits: AtomicU32,
}

impl PendingBits {
    /// Empty set
    pub const fn new() -> Self {
        Self {
            bits: AtomicU32::new(0),
        }
    }

    /// OR `bits` into the set.
    #[inline]
    pub fn merge(&self, bits: u32) {
        self.bits.fetch_or(bits, Ordering::AcqRel);
    }

    /// Atomically take and clear the whole set.
    #[inline]
    pub fn take(&self) -> u32 {
        self.bits.swap(0, Ordering::AcqRel)
    }

    /// Current set without clearing it.
    #[inline]
    pub fn peek(&self) -> u32 {
        self.bits.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::thread;

    #[test]
    fn critical_section_cell_new() {
        let cell: CriticalSectionCell<u32> = CriticalSectionCell::new(42);
        let value = cell.with(|v| *v);
        assert_eq!(value, 42);
    }

    #[test]
    fn critical_section_cell_with_mutates() {
        let cell: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
        cell.with(|v| *v += 10);
        assert_eq!(cell.with_ref(|v| *v), 10);
    }

    #[test]
    fn critical_section_cell_static_usage() {
        static CELL: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
        CELL.with(|v| *v = 100);
        assert_eq!(CELL.with(|v| *v), 100);
    }

    #[test]
    fn pending_bits_take_clears() {
        let pending = PendingBits::new();
        pending.merge(0x1);
        pending.merge(0x40);
        assert_eq!(pending.peek(), 0x41);
        assert_eq!(pending.take(), 0x41);
        assert_eq!(pending.take(), 0);
    }

    #[test]
    fn pending_bits_concurrent_merge_is_lossless() {
        let pending = PendingBits::new();
        let mut drained = 0u32;

        thread::scope(|s| {
            for i in 0..16u32 {
                let pending = &pending;
                s.spawn(move || {
                    for _ in 0..100 {
                        pending.merge(1 << i);
                    }
                });
            }
            for _ in 0..1000 {
                drained |= pending.take();
            }
        });
        drained |= pending.take();

        assert_eq!(drained, 0xFFFF);
    }
}
