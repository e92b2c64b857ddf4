//! Testing utilities and mock implementations
//!
//! This module provides a register-file simulator and mock host services for
//! testing the EQOS control core on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::driver::config::{LinkState, Resource};
use crate::driver::host::{AdapterCapabilities, Host, QueueNotify, RegisterMapper};
use crate::internal::register::dma::{DMA_CH0_STATUS, DMA_MODE};
use crate::internal::register::mac::{
    MAC_HW_FEATURE0, MAC_HW_FEATURE1, MAC_INTERRUPT_STATUS, MAC_PHYIF_CONTROL_STATUS,
    MAC_VERSION, mac_address_high, mac_address_low,
};
use crate::internal::register::{REGISTER_BLOCK_SIZE, RegisterBlock};
use crate::sync::CriticalSectionCell;

// =============================================================================
// Register File Simulator
// =============================================================================

const SOFTWARE_RESET: u32 = 1 << 0;
const LINK_STATUS: u32 = 1 << 0;

#[derive(Debug)]
struct SimState {
    regs: Vec<u32>,
    writes: Vec<(usize, u32)>,
    reset_busy_polls: u32,
}

/// Register-file simulator for the EQOS register window
///
/// Plain storage with the side effects the driver relies on:
///
/// - reading the PHY interface status clears the MAC link-change cause
/// - writing the channel status register clears the written bits
/// - the software reset bit stays set for a programmable number of reads
///
/// Every `write32` is logged; [`set`](Self::set) and [`get`](Self::get) are
/// backdoor accesses without side effects.
///
/// # Example
///
/// ```ignore
/// let sim = SimRegisters::new();
/// sim.raise_channel(1 << 6);
/// assert!(irq.on_interrupt(&sim, || {}));
/// assert_eq!(sim.get(DMA_CH0_STATUS.offset()), 0);
/// ```
#[derive(Debug)]
pub struct SimRegisters {
    state: CriticalSectionCell<SimState>,
}

impl Default for SimRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl SimRegisters {
    /// All registers zero
    pub fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(SimState {
                regs: vec![0; REGISTER_BLOCK_SIZE / 4],
                writes: Vec::new(),
                reset_busy_polls: 0,
            }),
        }
    }

    /// A supported part: version 0x51/0x10, gigabit, four address slots,
    /// 16 KiB FIFOs, 40-bit DMA and `02:11:22:33:44:55` in slot 0.
    pub fn eqos() -> Self {
        let sim = Self::new();
        sim.set(MAC_VERSION.offset(), 0x0000_1051);
        sim.set(MAC_HW_FEATURE0.offset(), (4 << 18) | (1 << 1) | (1 << 0));
        sim.set(MAC_HW_FEATURE1.offset(), (1 << 14) | (7 << 6) | 7);
        sim.set(mac_address_high(0).offset(), 0x8000_5544);
        sim.set(mac_address_low(0).offset(), 0x3322_1102);
        sim
    }

    /// Backdoor write, not logged
    pub fn set(&self, offset: usize, value: u32) {
        self.state.with(|s| s.regs[offset / 4] = value);
    }

    /// Backdoor read, no side effects
    pub fn get(&self, offset: usize) -> u32 {
        self.state.with_ref(|s| s.regs[offset / 4])
    }

    /// Every logged write as `(offset, value)`, oldest first
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.with_ref(|s| s.writes.clone())
    }

    /// Values written to one register, oldest first
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.state.with_ref(|s| {
            s.writes
                .iter()
                .filter(|(o, _)| *o == offset)
                .map(|(_, v)| *v)
                .collect()
        })
    }

    /// Forget the write log
    pub fn clear_writes(&self) {
        self.state.with(|s| s.writes.clear());
    }

    /// Keep the software reset bit set for `polls` reads
    pub fn set_reset_busy_polls(&self, polls: u32) {
        self.state.with(|s| s.reset_busy_polls = polls);
    }

    /// Latch a link-change cause
    pub fn raise_link_change(&self) {
        self.state
            .with(|s| s.regs[MAC_INTERRUPT_STATUS.offset() / 4] |= LINK_STATUS);
    }

    /// Latch channel status bits
    pub fn raise_channel(&self, bits: u32) {
        self.state
            .with(|s| s.regs[DMA_CH0_STATUS.offset() / 4] |= bits);
    }
}

impl RegisterBlock for SimRegisters {
    fn read32(&self, offset: usize) -> u32 {
        assert!(offset < REGISTER_BLOCK_SIZE && offset.is_multiple_of(4));
        self.state.with(|s| {
            let index = offset / 4;
            if offset == MAC_PHYIF_CONTROL_STATUS.offset() {
                s.regs[MAC_INTERRUPT_STATUS.offset() / 4] &= !LINK_STATUS;
            } else if offset == DMA_MODE.offset() && s.regs[index] & SOFTWARE_RESET != 0 {
                if s.reset_busy_polls > 0 {
                    s.reset_busy_polls -= 1;
                } else {
                    s.regs[index] &= !SOFTWARE_RESET;
                }
            }
            s.regs[index]
        })
    }

    fn write32(&self, offset: usize, value: u32) {
        assert!(offset < REGISTER_BLOCK_SIZE && offset.is_multiple_of(4));
        self.state.with(|s| {
            s.writes.push((offset, value));
            let index = offset / 4;
            if offset == DMA_CH0_STATUS.offset() {
                s.regs[index] &= !value;
            } else {
                s.regs[index] = value;
            }
        });
    }
}

// =============================================================================
// Mock Register Mapper
// =============================================================================

/// Mapper that hands out a shared simulator
#[derive(Debug)]
pub struct SimMapper<'a> {
    sim: &'a SimRegisters,
    fail: bool,
    mapped: Vec<(u64, usize)>,
    unmapped: u32,
}

impl<'a> SimMapper<'a> {
    pub fn new(sim: &'a SimRegisters) -> Self {
        Self {
            sim,
            fail: false,
            mapped: Vec::new(),
            unmapped: 0,
        }
    }

    /// Mapper whose every `map` call fails
    pub fn failing(sim: &'a SimRegisters) -> Self {
        Self {
            fail: true,
            ..Self::new(sim)
        }
    }

    /// `(start, length)` of every successful map call
    pub fn mapped(&self) -> &[(u64, usize)] {
        &self.mapped
    }

    /// Number of unmap calls
    pub fn unmapped(&self) -> u32 {
        self.unmapped
    }

    /// Mappings still outstanding
    pub fn live(&self) -> usize {
        self.mapped.len() - self.unmapped as usize
    }
}

impl<'a> RegisterMapper for SimMapper<'a> {
    type Block = &'a SimRegisters;

    fn map(&mut self, start: u64, length: usize) -> Option<&'a SimRegisters> {
        if self.fail {
            return None;
        }
        self.mapped.push((start, length));
        Some(self.sim)
    }

    fn unmap(&mut self, _block: &'a SimRegisters) {
        self.unmapped += 1;
    }
}

/// A memory window large enough for the register block
pub fn register_window() -> Resource {
    Resource::Memory {
        start: 0xFE1B_0000,
        length: 0x1_0000,
    }
}

/// The usual resource list: one register window, one interrupt line
pub fn standard_resources() -> [Resource; 2] {
    [register_window(), Resource::Interrupt { vector: 42 }]
}

// =============================================================================
// Mock Host
// =============================================================================

#[derive(Debug, Default)]
struct HostLog {
    link_states: Vec<LinkState>,
    capabilities: Option<AdapterCapabilities>,
}

/// Mock network stack
///
/// Records published link states and capabilities, counts deferred-work
/// requests and fills random buffers with a fixed byte.
#[derive(Debug)]
pub struct MockHost {
    log: CriticalSectionCell<HostLog>,
    scheduled: AtomicU32,
    started: AtomicU32,
    refuse_start: AtomicBool,
    random_byte: u8,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            log: CriticalSectionCell::new(HostLog::default()),
            scheduled: AtomicU32::new(0),
            started: AtomicU32::new(0),
            refuse_start: AtomicBool::new(false),
            random_byte: 0xA5,
        }
    }

    /// Host that refuses to start the datapath
    pub fn refusing_start() -> Self {
        let host = Self::new();
        host.refuse_start.store(true, Ordering::Relaxed);
        host
    }

    /// Every published link state, oldest first
    pub fn link_states(&self) -> Vec<LinkState> {
        self.log.with_ref(|l| l.link_states.clone())
    }

    /// Last published capabilities
    pub fn capabilities(&self) -> Option<AdapterCapabilities> {
        self.log.with_ref(|l| l.capabilities)
    }

    /// Number of deferred-work requests
    pub fn scheduled(&self) -> u32 {
        self.scheduled.load(Ordering::Relaxed)
    }

    /// Number of datapath start requests
    pub fn started(&self) -> u32 {
        self.started.load(Ordering::Relaxed)
    }

    /// Byte used for every random fill
    pub fn random_byte(&self) -> u8 {
        self.random_byte
    }
}

impl Host for MockHost {
    fn set_link_state(&self, state: &LinkState) {
        self.log.with(|l| l.link_states.push(*state));
    }

    fn set_capabilities(&self, caps: &AdapterCapabilities) {
        self.log.with(|l| l.capabilities = Some(*caps));
    }

    fn start_datapath(&self) -> bool {
        self.started.fetch_add(1, Ordering::Relaxed);
        !self.refuse_start.load(Ordering::Relaxed)
    }

    fn fill_random(&self, buf: &mut [u8]) {
        buf.fill(self.random_byte);
    }

    fn schedule_deferred(&self) {
        self.scheduled.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// Mock Queue
// =============================================================================

/// Datapath queue that counts notifications
#[derive(Debug, Default)]
pub struct MockQueue {
    notifications: AtomicU32,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of "more available" notifications received
    pub fn notifications(&self) -> u32 {
        self.notifications.load(Ordering::Relaxed)
    }
}

impl QueueNotify for MockQueue {
    fn notify_more_available(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: u64,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        self.total_ns
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1000));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::mac::MAC_CONFIGURATION;

    #[test]
    fn write_log_and_backdoor() {
        let sim = SimRegisters::new();
        sim.set(MAC_CONFIGURATION.offset(), 7);
        assert!(sim.writes().is_empty());
        sim.write32(MAC_CONFIGURATION.offset(), 3);
        assert_eq!(sim.get(MAC_CONFIGURATION.offset()), 3);
        assert_eq!(sim.writes_to(MAC_CONFIGURATION.offset()), [3]);
        sim.clear_writes();
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn channel_status_is_write_one_to_clear() {
        let sim = SimRegisters::new();
        sim.raise_channel(0b101);
        sim.write32(DMA_CH0_STATUS.offset(), 0b001);
        assert_eq!(sim.get(DMA_CH0_STATUS.offset()), 0b100);
    }

    #[test]
    fn reset_bit_clears_after_busy_reads() {
        let sim = SimRegisters::new();
        sim.set_reset_busy_polls(1);
        sim.write32(DMA_MODE.offset(), SOFTWARE_RESET);
        assert_eq!(sim.read32(DMA_MODE.offset()), SOFTWARE_RESET);
        assert_eq!(sim.read32(DMA_MODE.offset()), 0);
    }
}
