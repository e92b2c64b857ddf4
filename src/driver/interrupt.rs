//! Interrupt coordination for the EQOS MAC.
//!
//! Interrupts are split in two halves:
//!
//! - The **top half** ([`InterruptCoordinator::on_interrupt`]) runs in
//!   interrupt context. It reads and acknowledges the hardware status,
//!   merges it into a pending word and schedules the deferred worker. It
//!   never takes the device lock.
//! - The **deferred worker** ([`InterruptCoordinator::on_deferred`]) drains
//!   the pending word until it is empty, refreshing the link state and
//!   notifying the datapath queues.
//!
//! Rx and tx notifications are one-shot: a queue registers a handle, the
//! first matching interrupt notifies it, clears the handle and masks that
//! interrupt category again. The queue re-arms by registering anew.
//!
//! The interrupt mask and the queue handles are guarded together by one
//! critical-section lock; every change to the mask rewrites both enable
//! registers.

use core::ops::{BitOr, Not};

use crate::driver::host::QueueNotify;
use crate::driver::stats::{DriverStats, InterruptCounters};
use crate::internal::register::RegisterBlock;
use crate::internal::register::dma::{
    ChannelInterruptEnable, ChannelStatus, DMA_CH0_INTERRUPT_ENABLE, DMA_CH0_STATUS,
};
use crate::internal::register::mac::{
    MAC_INTERRUPT_ENABLE, MAC_INTERRUPT_STATUS, MAC_PHYIF_CONTROL_STATUS, MacInterruptEnable,
};
use crate::sync::{CriticalSectionCell, PendingBits};

/// Pending-word bit standing in for the MAC link status interrupt.
///
/// The rest of the word uses the channel status layout, which never sets
/// bit 31.
pub const LINK_STATUS_BIT: u32 = 0x8000_0000;

// =============================================================================
// Interrupt Categories
// =============================================================================

/// Set of interrupt categories the driver currently wants delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupts(u8);

impl Interrupts {
    /// Nothing
    pub const NONE: Self = Self(0);
    /// Link change, abnormal summary, fatal bus error
    pub const STATE: Self = Self(1 << 0);
    /// Receive complete
    pub const RX: Self = Self(1 << 1);
    /// Transmit complete
    pub const TX: Self = Self(1 << 2);
    /// Every category
    pub const ALL: Self = Self(Self::STATE.0 | Self::RX.0 | Self::TX.0);

    /// Raw bits
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every category in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no category is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Categories in `self` but not in `other`
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// MAC interrupt enable value for this set
    pub fn mac_interrupt_enable(self) -> MacInterruptEnable {
        let mut enable = MacInterruptEnable::ZERO;
        enable.set_link_status(self.contains(Self::STATE));
        enable
    }

    /// Channel 0 interrupt enable value for this set.
    ///
    /// The normal summary is always enabled; rx/tx only reach the CPU
    /// through it.
    pub fn channel_interrupt_enable(self) -> ChannelInterruptEnable {
        let state = self.contains(Self::STATE);
        let mut enable = ChannelInterruptEnable::ZERO;
        enable
            .set_rx(self.contains(Self::RX))
            .set_tx(self.contains(Self::TX))
            .set_normal_interrupt_summary(true)
            .set_fatal_bus_error(state)
            .set_abnormal_interrupt_summary(state);
        enable
    }
}

impl BitOr for Interrupts {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Not for Interrupts {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

// =============================================================================
// Pending Status
// =============================================================================

/// Interrupt causes decoded from one drain of the pending word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Receive complete
    pub rx: bool,
    /// Transmit complete
    pub tx: bool,
    /// Abnormal interrupt summary
    pub abnormal_summary: bool,
    /// Fatal bus error
    pub fatal_bus_error: bool,
    /// Link status changed
    pub link_status: bool,
}

impl InterruptStatus {
    /// Decode a pending word
    #[inline]
    pub fn from_raw(pending: u32) -> Self {
        let channel = ChannelStatus(pending & !LINK_STATUS_BIT);
        Self {
            rx: channel.rx(),
            tx: channel.tx(),
            abnormal_summary: channel.abnormal_interrupt_summary(),
            fatal_bus_error: channel.fatal_bus_error(),
            link_status: pending & LINK_STATUS_BIT != 0,
        }
    }

    /// Check if a hardware error was reported
    #[inline]
    pub fn has_error(&self) -> bool {
        self.abnormal_summary || self.fatal_bus_error
    }

    /// Rx/tx categories present
    #[inline]
    pub fn rx_tx(&self) -> Interrupts {
        let mut wanted = Interrupts::NONE;
        if self.rx {
            wanted = wanted | Interrupts::RX;
        }
        if self.tx {
            wanted = wanted | Interrupts::TX;
        }
        wanted
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// State guarded by the device lock
#[derive(Debug)]
struct NotifyState<Q> {
    wanted: Interrupts,
    rx_queue: Option<Q>,
    tx_queue: Option<Q>,
}

impl<Q> NotifyState<Q> {
    /// Program both enable registers if the wanted set changes.
    fn set_wanted<R: RegisterBlock>(&mut self, regs: &R, new: Interrupts) {
        let old = self.wanted;
        if old == new {
            return;
        }
        self.wanted = new;
        regs.store(MAC_INTERRUPT_ENABLE, new.mac_interrupt_enable());
        regs.store(DMA_CH0_INTERRUPT_ENABLE, new.channel_interrupt_enable());

        #[cfg(feature = "defmt")]
        defmt::trace!("interrupts wanted {=u8:#x} -> {=u8:#x}", old.bits(), new.bits());
    }

    fn enable<R: RegisterBlock>(&mut self, regs: &R, bits: Interrupts) {
        self.set_wanted(regs, self.wanted | bits);
    }

    fn disable<R: RegisterBlock>(&mut self, regs: &R, bits: Interrupts) {
        self.set_wanted(regs, self.wanted.difference(bits));
    }
}

/// Interrupt mask, queue registrations and pending status for one device.
///
/// `Q` is the handle a datapath queue registers to be notified.
#[derive(Debug)]
pub struct InterruptCoordinator<Q> {
    state: CriticalSectionCell<NotifyState<Q>>,
    pending: PendingBits,
    counters: InterruptCounters,
}

impl<Q: QueueNotify> InterruptCoordinator<Q> {
    /// Nothing wanted, nothing registered, nothing pending
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(NotifyState {
                wanted: Interrupts::NONE,
                rx_queue: None,
                tx_queue: None,
            }),
            pending: PendingBits::new(),
            counters: InterruptCounters::new(),
        }
    }

    /// Categories currently enabled
    pub fn wanted(&self) -> Interrupts {
        self.state.with_ref(|s| s.wanted)
    }

    /// Add `bits` to the enabled set. No register write if nothing changes.
    pub fn enable<R: RegisterBlock>(&self, regs: &R, bits: Interrupts) {
        self.state.with(|s| s.enable(regs, bits));
    }

    /// Remove `bits` from the enabled set. No register write if nothing
    /// changes.
    pub fn disable<R: RegisterBlock>(&self, regs: &R, bits: Interrupts) {
        self.state.with(|s| s.disable(regs, bits));
    }

    /// Register (or with `None`, clear) the rx notification handle.
    ///
    /// Registering enables rx interrupts; clearing disables them.
    pub fn set_rx_queue<R: RegisterBlock>(&self, regs: &R, queue: Option<Q>) {
        self.state.with(|s| {
            let arm = queue.is_some();
            s.rx_queue = queue;
            if arm {
                s.enable(regs, Interrupts::RX);
            } else {
                s.disable(regs, Interrupts::RX);
            }
        });
    }

    /// Register (or with `None`, clear) the tx notification handle.
    ///
    /// Registering enables tx interrupts; clearing disables them.
    pub fn set_tx_queue<R: RegisterBlock>(&self, regs: &R, queue: Option<Q>) {
        self.state.with(|s| {
            let arm = queue.is_some();
            s.tx_queue = queue;
            if arm {
                s.enable(regs, Interrupts::TX);
            } else {
                s.disable(regs, Interrupts::TX);
            }
        });
    }

    /// True if an rx handle is registered
    pub fn rx_armed(&self) -> bool {
        self.state.with_ref(|s| s.rx_queue.is_some())
    }

    /// True if a tx handle is registered
    pub fn tx_armed(&self) -> bool {
        self.state.with_ref(|s| s.tx_queue.is_some())
    }

    /// Interrupt top half.
    ///
    /// Returns `false` without side effects on hardware if the device has
    /// nothing pending (shared line). Otherwise acknowledges the causes,
    /// merges them into the pending word, calls `schedule` and returns
    /// `true`.
    pub fn on_interrupt<R: RegisterBlock>(&self, regs: &R, schedule: impl FnOnce()) -> bool {
        let mac = regs.load(MAC_INTERRUPT_STATUS);
        let channel = regs.load(DMA_CH0_STATUS);

        if !mac.link_status() && channel.bits() == 0 {
            InterruptCounters::bump(&self.counters.isr_ignored);
            return false;
        }

        if mac.link_status() {
            // read-to-clear
            let _ = regs.load(MAC_PHYIF_CONTROL_STATUS);
        }
        if channel.bits() != 0 {
            // write-1-to-clear
            regs.store(DMA_CH0_STATUS, channel);
        }

        let link = if mac.link_status() { LINK_STATUS_BIT } else { 0 };
        self.pending.merge(channel.bits() | link);
        schedule();

        InterruptCounters::bump(&self.counters.isr_handled);
        true
    }

    /// Deferred worker.
    ///
    /// Drains the pending word until it reads zero. Hardware errors are
    /// counted and logged only. `on_link_change` runs outside the lock.
    pub fn on_deferred<R: RegisterBlock>(&self, regs: &R, mut on_link_change: impl FnMut()) {
        loop {
            let raw = self.pending.take();
            if raw == 0 {
                break;
            }
            let status = InterruptStatus::from_raw(raw);

            if status.has_error() {
                if status.abnormal_summary {
                    InterruptCounters::bump(&self.counters.dpc_abnormal_status);
                }
                if status.fatal_bus_error {
                    InterruptCounters::bump(&self.counters.dpc_fatal_bus_error);
                }
                #[cfg(feature = "defmt")]
                defmt::error!("deferred: hardware error status={=u32:#x}", raw);
            } else {
                #[cfg(feature = "defmt")]
                defmt::trace!("deferred: status={=u32:#x}", raw);
            }

            if status.link_status {
                InterruptCounters::bump(&self.counters.dpc_link_state);
                on_link_change();
            }

            let rx_tx = status.rx_tx();
            if rx_tx.is_empty() {
                continue;
            }

            self.state.with(|s| {
                s.disable(regs, rx_tx);

                // A cause with no registered handle is dropped
                if status.rx
                    && let Some(queue) = s.rx_queue.take()
                {
                    InterruptCounters::bump(&self.counters.dpc_rx);
                    queue.notify_more_available();
                }
                if status.tx
                    && let Some(queue) = s.tx_queue.take()
                {
                    InterruptCounters::bump(&self.counters.dpc_tx);
                    queue.notify_more_available();
                }
            });
        }
    }

    /// Snapshot of the interrupt counters
    pub fn stats(&self) -> DriverStats {
        self.counters.snapshot()
    }
}

impl<Q: QueueNotify> Default for InterruptCoordinator<Q> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
