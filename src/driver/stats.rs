//! Driver and hardware statistics
//!
//! Driver counters are bumped from the interrupt top half and the deferred
//! worker; they are diagnostic only and use relaxed atomics. Hardware
//! counters come from the MMC block and are read on demand.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::internal::register::RegisterBlock;
use crate::internal::register::mmc::{
    RX_CRC_ERROR_PACKETS, RX_FIFO_OVERFLOW_PACKETS, RX_LENGTH_ERROR_PACKETS,
    RX_PACKET_COUNT_GOOD_BAD, RX_PAUSE_PACKETS, RX_WATCHDOG_ERROR_PACKETS,
    TX_CARRIER_ERROR_PACKETS, TX_PACKET_COUNT_GOOD, TX_PACKET_COUNT_GOOD_BAD, TX_PAUSE_PACKETS,
    TX_UNDERFLOW_ERROR_PACKETS,
};

/// Snapshot of the driver's interrupt counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverStats {
    /// Top-half invocations that found work
    pub isr_handled: u32,
    /// Top-half invocations for another device on a shared line
    pub isr_ignored: u32,
    /// Link changes processed
    pub dpc_link_state: u32,
    /// Rx notifications delivered
    pub dpc_rx: u32,
    /// Tx notifications delivered
    pub dpc_tx: u32,
    /// Abnormal interrupt summaries seen
    pub dpc_abnormal_status: u32,
    /// Fatal bus errors seen
    pub dpc_fatal_bus_error: u32,
}

/// Live counters behind [`DriverStats`]
#[derive(Debug, Default)]
pub(crate) struct InterruptCounters {
    pub isr_handled: AtomicU32,
    pub isr_ignored: AtomicU32,
    pub dpc_link_state: AtomicU32,
    pub dpc_rx: AtomicU32,
    pub dpc_tx: AtomicU32,
    pub dpc_abnormal_status: AtomicU32,
    pub dpc_fatal_bus_error: AtomicU32,
}

impl InterruptCounters {
    pub const fn new() -> Self {
        Self {
            isr_handled: AtomicU32::new(0),
            isr_ignored: AtomicU32::new(0),
            dpc_link_state: AtomicU32::new(0),
            dpc_rx: AtomicU32::new(0),
            dpc_tx: AtomicU32::new(0),
            dpc_abnormal_status: AtomicU32::new(0),
            dpc_fatal_bus_error: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DriverStats {
        DriverStats {
            isr_handled: self.isr_handled.load(Ordering::Relaxed),
            isr_ignored: self.isr_ignored.load(Ordering::Relaxed),
            dpc_link_state: self.dpc_link_state.load(Ordering::Relaxed),
            dpc_rx: self.dpc_rx.load(Ordering::Relaxed),
            dpc_tx: self.dpc_tx.load(Ordering::Relaxed),
            dpc_abnormal_status: self.dpc_abnormal_status.load(Ordering::Relaxed),
            dpc_fatal_bus_error: self.dpc_fatal_bus_error.load(Ordering::Relaxed),
        }
    }
}

/// Selected MMC hardware counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MmcStats {
    /// Tx packets, good and bad
    pub tx_packets_good_bad: u32,
    /// Tx packets, good only
    pub tx_packets_good: u32,
    /// Tx underflow aborts
    pub tx_underflow_errors: u32,
    /// Tx carrier sense errors
    pub tx_carrier_errors: u32,
    /// Tx pause packets
    pub tx_pause_packets: u32,
    /// Rx packets, good and bad
    pub rx_packets_good_bad: u32,
    /// Rx CRC errors
    pub rx_crc_errors: u32,
    /// Rx length errors
    pub rx_length_errors: u32,
    /// Rx pause packets
    pub rx_pause_packets: u32,
    /// Rx FIFO overflow drops
    pub rx_fifo_overflows: u32,
    /// Rx watchdog errors
    pub rx_watchdog_errors: u32,
}

impl MmcStats {
    /// Read the counters
    pub fn read<R: RegisterBlock>(regs: &R) -> Self {
        Self {
            tx_packets_good_bad: regs.load(TX_PACKET_COUNT_GOOD_BAD),
            tx_packets_good: regs.load(TX_PACKET_COUNT_GOOD),
            tx_underflow_errors: regs.load(TX_UNDERFLOW_ERROR_PACKETS),
            tx_carrier_errors: regs.load(TX_CARRIER_ERROR_PACKETS),
            tx_pause_packets: regs.load(TX_PAUSE_PACKETS),
            rx_packets_good_bad: regs.load(RX_PACKET_COUNT_GOOD_BAD),
            rx_crc_errors: regs.load(RX_CRC_ERROR_PACKETS),
            rx_length_errors: regs.load(RX_LENGTH_ERROR_PACKETS),
            rx_pause_packets: regs.load(RX_PAUSE_PACKETS),
            rx_fifo_overflows: regs.load(RX_FIFO_OVERFLOW_PACKETS),
            rx_watchdog_errors: regs.load(RX_WATCHDOG_ERROR_PACKETS),
        }
    }
}
