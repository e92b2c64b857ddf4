//! Synchronization and Concurrency Support
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability, used as the
//!   device lock around the interrupt mask and queue registrations
//! - [`PendingBits`] - lock-free status word merged by the interrupt top
//!   half and drained by the deferred worker

mod primitives;

pub use primitives::{CriticalSectionCell, PendingBits};
