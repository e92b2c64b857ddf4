//! EQOS device core.
//!
//! This module contains the [`Device`] structure that owns everything scoped
//! to one prepared adapter and wires the other driver modules together:
//!
//! - Hardware lifecycle: prepare, D0 entry/exit, release
//! - Receive filter requests from the host
//! - Queue notification registration from the datapath
//! - Interrupt top half and deferred worker
//!
//! A `Device` exists only between a successful
//! [`prepare_hardware`](Device::prepare_hardware) and
//! [`release_hardware`](Device::release_hardware), so there is no
//! "not prepared" state to check at runtime.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use super::address::{read_permanent_address, select_current_address};
use super::config::{
    HostConfig, InterruptLine, LinkLayerAddress, LinkState, MacAddress, PacketFilterFlags,
    Resource,
};
use super::error::{ConfigError, Error, IoError, Result};
use super::features::{DmaCapabilities, FeatureCaps};
use super::filtering::apply_receive_filter;
use super::host::{AdapterCapabilities, DatapathCapabilities, Host, QueueNotify, RegisterMapper};
use super::interrupt::{InterruptCoordinator, Interrupts};
use super::link::refresh_link_state;
use super::stats::{DriverStats, MmcStats};
use crate::hal::reset::ResetController;
use crate::internal::constants::{
    BUS_BYTES, DEFAULT_AXI_MAX_READ_OUTSTANDING, DEFAULT_AXI_MAX_WRITE_OUTSTANDING,
    DEFAULT_CSR_RATE_HZ, DESCRIPTOR_HW_SIZE, DESCRIPTOR_SIZE, MAX_DMA_MAPPING_SIZE, MTU,
    PAUSE_TIME_MAX, QUEUE_BURST_LENGTH_X8, QUEUE_DESCRIPTOR_MIN_COUNT, RX_BUFFER_SIZE,
    RX_FLOW_ACTIVATE, RX_FLOW_CTRL_DEFAULT, RX_FLOW_DEACTIVATE, RXQ0_ENABLE_GENERIC,
};
use crate::internal::register::dma::{DMA_CH0_CONTROL, DMA_CH0_STATUS, DMA_SYSBUS_MODE};
use crate::internal::register::mac::{
    MAC_1US_TIC_COUNTER, MAC_CONFIGURATION, MAC_RX_FLOW_CTRL, MAC_RXQ_CTRL0, MAC_TX_FLOW_CTRL,
    MacConfiguration, MacTxFlowCtrl,
};
use crate::internal::register::mmc::{MMC_CONTROL, MMC_CONTROL_COUNTER_RESET};
use crate::internal::register::mtl::{
    MTL_RXQ0_OPERATION_MODE, MTL_TX_QUEUE_ENABLED, MTL_TXQ0_OPERATION_MODE, MtlRxOperationMode,
    MtlTxOperationMode, fifo_queue_size,
};
use crate::internal::register::{REGISTER_BLOCK_SIZE, RegisterBlock};

// =============================================================================
// Resource Scan
// =============================================================================

/// Find the register window and the primary interrupt line, and map the window.
///
/// The first window covering [`REGISTER_BLOCK_SIZE`] is used; later windows
/// and windows that are too small are ignored. The first interrupt line is
/// primary and the second is the power-management line; any further lines
/// are ignored.
///
/// # Errors
///
/// - `ConfigError::MapFailed`: the mapper refused the window
/// - `ConfigError::RegisterWindowTooSmall`: windows were offered, none fits
/// - `ConfigError::NoRegisterWindow`: no memory window at all
/// - `ConfigError::NoInterrupt`: no interrupt line; the window is unmapped
fn scan_resources<M: RegisterMapper>(
    resources: &[Resource],
    mapper: &mut M,
) -> Result<(M::Block, InterruptLine)> {
    let mut regs = None;
    let mut saw_small_window = false;
    let mut interrupts = 0usize;
    let mut primary = None;

    for resource in resources {
        match *resource {
            Resource::Memory { start, length } => {
                if regs.is_some() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ignoring extra memory window {=u64:#x}+{=u64:#x}", start, length);
                } else if length < REGISTER_BLOCK_SIZE as u64 {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("memory window {=u64:#x}+{=u64:#x} too small", start, length);
                    saw_small_window = true;
                } else {
                    match mapper.map(start, REGISTER_BLOCK_SIZE) {
                        Some(block) => regs = Some(block),
                        None => {
                            #[cfg(feature = "defmt")]
                            defmt::error!("mapping register window {=u64:#x} failed", start);
                            return Err(ConfigError::MapFailed.into());
                        }
                    }
                }
            }
            Resource::Interrupt { vector } => {
                match interrupts {
                    0 => primary = Some(InterruptLine { vector }),
                    1 => {
                        #[cfg(feature = "defmt")]
                        defmt::debug!("pmt interrupt {=u32} not used", vector);
                    }
                    _ => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("ignoring extra interrupt {=u32}", vector);
                    }
                }
                interrupts += 1;
            }
            #[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
            Resource::Other { kind } => {
                #[cfg(feature = "defmt")]
                defmt::warn!("ignoring resource of type {=u8}", kind);
            }
        }
    }

    let Some(regs) = regs else {
        #[cfg(feature = "defmt")]
        defmt::error!("no usable register window among {=usize} resources", resources.len());
        let err = if saw_small_window {
            ConfigError::RegisterWindowTooSmall
        } else {
            ConfigError::NoRegisterWindow
        };
        return Err(err.into());
    };

    match primary {
        Some(line) => Ok((regs, line)),
        None => {
            #[cfg(feature = "defmt")]
            defmt::error!("no interrupt line");
            mapper.unmap(regs);
            Err(ConfigError::NoInterrupt.into())
        }
    }
}

/// Values discovered during bring-up
struct Discovery {
    features: FeatureCaps,
    dma: DmaCapabilities,
    permanent_address: MacAddress,
    current_address: MacAddress,
}

// =============================================================================
// Device
// =============================================================================

/// One prepared EQOS adapter
///
/// Lifecycle and filter calls are serialized by the host. The interrupt
/// top half ([`on_interrupt`](Self::on_interrupt)) may run concurrently with
/// any of them; it only touches the pending word and the acknowledge
/// registers.
///
/// # Type Parameters
/// * `R` - Register window access
/// * `H` - Host services
/// * `Q` - Datapath queue notification handle
///
/// # Example
/// ```ignore
/// let device = Device::prepare_hardware(host, &HostConfig::new(), &resources, &mut mapper, delay)?;
/// device.d0_entry()?;
/// // ...
/// device.d0_exit()?;
/// device.release_hardware(&mut mapper, delay)?;
/// ```
pub struct Device<R: RegisterBlock, H: Host, Q: QueueNotify> {
    /// Mapped register window
    regs: R,
    /// Host services
    host: H,
    /// Primary interrupt line
    interrupt: InterruptLine,
    /// Version and feature snapshot
    features: FeatureCaps,
    /// Negotiated DMA addressing
    dma: DmaCapabilities,
    /// Address found in hardware at prepare
    permanent_address: MacAddress,
    /// Address the adapter receives on
    current_address: MacAddress,
    /// Interrupt mask, queue handles and pending causes
    irq: InterruptCoordinator<Q>,
    /// Between D0 entry and D0 exit
    in_d0: AtomicBool,
}

impl<R: RegisterBlock, H: Host, Q: QueueNotify> Device<R, H, Q> {
    // =========================================================================
    // Prepare / Release
    // =========================================================================

    /// Bring the hardware up and publish it to the host.
    ///
    /// Locates and maps the register window, discovers addresses and
    /// features, publishes capabilities and a disconnected link, resets the
    /// core, programs the one-time bus settings and starts the datapath.
    ///
    /// # Parameters
    /// * `host` - Host services, kept for the lifetime of the device
    /// * `config` - Host configuration (optional address override)
    /// * `resources` - Platform resources assigned to the device
    /// * `mapper` - Maps the register window
    /// * `delay` - Delay provider for the reset poll
    ///
    /// # Errors
    ///
    /// - Any resource scan error (see the list on each `ConfigError`)
    /// - `ConfigError::UnsupportedVersion`: hardware revision not supported
    /// - `ConfigError::UnknownAddressWidth`: DMA width not recognized
    /// - `IoError::Timeout`: software reset did not complete
    /// - `ConfigError::DatapathStartFailed`: the host refused to start
    ///
    /// The register window is unmapped again on every error after mapping.
    pub fn prepare_hardware<M, D>(
        host: H,
        config: &HostConfig,
        resources: &[Resource],
        mapper: &mut M,
        delay: D,
    ) -> Result<Self>
    where
        M: RegisterMapper<Block = R>,
        D: DelayNs,
    {
        let (regs, interrupt) = scan_resources(resources, mapper)?;

        let found = match Self::bring_up(&regs, &host, config.mac_address.as_ref(), delay) {
            Ok(found) => found,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::error!("prepare failed: {}", e);
                mapper.unmap(regs);
                return Err(e);
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "prepared: irq {=u32} address {} dma {=u32}-bit",
            interrupt.vector,
            found.current_address,
            found.dma.width.bits()
        );

        Ok(Self {
            regs,
            host,
            interrupt,
            features: found.features,
            dma: found.dma,
            permanent_address: found.permanent_address,
            current_address: found.current_address,
            irq: InterruptCoordinator::new(),
            in_d0: AtomicBool::new(false),
        })
    }

    fn bring_up<D: DelayNs>(
        regs: &R,
        host: &H,
        address_override: Option<&LinkLayerAddress>,
        delay: D,
    ) -> Result<Discovery> {
        let permanent_address = read_permanent_address(regs);
        let current_address =
            select_current_address(address_override, permanent_address, |buf| {
                host.fill_random(buf);
            });

        let features = FeatureCaps::read(regs);
        #[cfg(feature = "defmt")]
        defmt::info!(
            "version {=u32:#x} features {=u32:#x} {=u32:#x} {=u32:#x} {=u32:#x}",
            features.version.bits(),
            features.feature0.bits(),
            features.feature1.bits(),
            features.feature2,
            features.feature3
        );
        features.check_version()?;
        let dma = features.dma_capabilities()?;

        host.set_capabilities(&AdapterCapabilities {
            current_address,
            permanent_address,
            mtu: MTU,
            link: features.link_capabilities(),
            datapath: DatapathCapabilities {
                dma,
                max_dma_mapping_size: MAX_DMA_MAPPING_SIZE,
                max_tx_fragments: QUEUE_DESCRIPTOR_MIN_COUNT - 1,
                rx_buffer_size: RX_BUFFER_SIZE,
            },
            receive_filter: features.receive_filter_capabilities(),
        });
        host.set_link_state(&LinkState::DISCONNECTED);

        ResetController::new(delay).soft_reset(regs, &current_address)?;

        let mut bus_mode = regs.load(DMA_SYSBUS_MODE);
        bus_mode
            .set_mixed_burst(true)
            .set_fixed_burst(false)
            .set_axi_max_write_outstanding(DEFAULT_AXI_MAX_WRITE_OUTSTANDING)
            .set_axi_max_read_outstanding(DEFAULT_AXI_MAX_READ_OUTSTANDING)
            .set_burst_length16(true)
            .set_burst_length8(true)
            .set_burst_length4(true);
        regs.store(DMA_SYSBUS_MODE, bus_mode);

        regs.store(MAC_1US_TIC_COUNTER, DEFAULT_CSR_RATE_HZ / 1_000_000 - 1);

        let mut channel = regs.load(DMA_CH0_CONTROL);
        channel
            .set_descriptor_skip_length(((DESCRIPTOR_SIZE - DESCRIPTOR_HW_SIZE) / BUS_BYTES) as u32)
            .set_pbl_x8(QUEUE_BURST_LENGTH_X8);
        regs.store(DMA_CH0_CONTROL, channel);

        regs.store(MMC_CONTROL, MMC_CONTROL_COUNTER_RESET);

        if !host.start_datapath() {
            return Err(ConfigError::DatapathStartFailed.into());
        }

        Ok(Discovery {
            features,
            dma,
            permanent_address,
            current_address,
        })
    }

    /// Quiesce the hardware and give the register window back.
    ///
    /// Logs the final statistics, resets the core with the permanent
    /// address restored to slot 0 and unmaps the window. The window is
    /// unmapped even if the reset times out.
    ///
    /// # Errors
    ///
    /// - `IoError::Timeout`: the reset did not complete
    pub fn release_hardware<M, D>(self, mapper: &mut M, delay: D) -> Result<()>
    where
        M: RegisterMapper<Block = R>,
        D: DelayNs,
    {
        #[cfg(feature = "defmt")]
        defmt::info!("release: {} {}", self.driver_stats(), self.mmc_stats());

        let result = ResetController::new(delay)
            .soft_reset(&self.regs, &self.permanent_address)
            .map(|_| ())
            .map_err(Error::from);
        #[cfg(feature = "defmt")]
        if let Err(e) = result {
            defmt::warn!("release: {}", e);
        }

        mapper.unmap(self.regs);
        result
    }

    // =========================================================================
    // Power State
    // =========================================================================

    /// Enter the working state.
    ///
    /// Programs flow control, the MTL queues and the MAC configuration,
    /// refreshes the link once, clears stale channel status and enables the
    /// state interrupts. Rx and tx interrupts stay off until a queue
    /// registers.
    ///
    /// # Errors
    ///
    /// - `IoError::InvalidState`: already in the working state
    pub fn d0_entry(&self) -> Result<()> {
        if self.in_d0.swap(true, Ordering::AcqRel) {
            return Err(IoError::InvalidState.into());
        }
        let regs = &self.regs;

        let mut tx_flow = MacTxFlowCtrl::ZERO;
        tx_flow
            .set_transmit_flow_control_enable(true)
            .set_pause_time(PAUSE_TIME_MAX);
        regs.store(MAC_TX_FLOW_CTRL, tx_flow);

        let mut tx_mode = MtlTxOperationMode::ZERO;
        tx_mode
            .set_store_and_forward(true)
            .set_queue_enable(MTL_TX_QUEUE_ENABLED)
            .set_queue_size(fifo_queue_size(self.features.tx_fifo_size_code()));
        regs.store(MTL_TXQ0_OPERATION_MODE, tx_mode);

        regs.store(MAC_RX_FLOW_CTRL, RX_FLOW_CTRL_DEFAULT);
        regs.store(MAC_RXQ_CTRL0, RXQ0_ENABLE_GENERIC);

        let mut rx_mode = MtlRxOperationMode::ZERO;
        rx_mode
            .set_store_and_forward(true)
            .set_forward_error_packets(true)
            .set_forward_undersized_good_packets(true)
            .set_queue_size(fifo_queue_size(self.features.rx_fifo_size_code()))
            .set_hardware_flow_control(true)
            .set_flow_control_activate(RX_FLOW_ACTIVATE)
            .set_flow_control_deactivate(RX_FLOW_DEACTIVATE);
        regs.store(MTL_RXQ0_OPERATION_MODE, rx_mode);

        let mut mac_config = MacConfiguration::ZERO;
        mac_config
            .set_disable_carrier_sense_during_transmit(true)
            .set_packet_burst_enable(true)
            .set_receiver_enable(true)
            .set_transmitter_enable(true);
        regs.store(MAC_CONFIGURATION, mac_config);

        refresh_link_state(regs, &self.host);

        let stale = regs.load(DMA_CH0_STATUS);
        if stale.bits() != 0 {
            regs.store(DMA_CH0_STATUS, stale);
        }
        self.irq.enable(regs, Interrupts::STATE);

        #[cfg(feature = "defmt")]
        defmt::info!("d0 entry: stale channel status {=u32:#x}", stale.bits());
        Ok(())
    }

    /// Leave the working state.
    ///
    /// Disables every interrupt category, then the receiver and
    /// transmitter. The datapath must have cleared both queue
    /// registrations first.
    ///
    /// # Errors
    ///
    /// - `IoError::InvalidState`: not in the working state
    pub fn d0_exit(&self) -> Result<()> {
        if !self.in_d0.swap(false, Ordering::AcqRel) {
            return Err(IoError::InvalidState.into());
        }

        self.irq.disable(&self.regs, Interrupts::ALL);
        debug_assert!(!self.irq.rx_armed(), "rx queue still registered at d0 exit");
        debug_assert!(!self.irq.tx_armed(), "tx queue still registered at d0 exit");

        let mut mac_config = self.regs.load(MAC_CONFIGURATION);
        mac_config
            .set_receiver_enable(false)
            .set_transmitter_enable(false);
        self.regs.store(MAC_CONFIGURATION, mac_config);

        #[cfg(feature = "defmt")]
        defmt::info!("d0 exit");
        Ok(())
    }

    /// Whether the device is between D0 entry and D0 exit
    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.in_d0.load(Ordering::Acquire)
    }

    // =========================================================================
    // Receive Filter
    // =========================================================================

    /// Apply a receive filter request from the host.
    ///
    /// The multicast list fills address slots 1 and up; entries past the
    /// table size are dropped.
    pub fn set_receive_filter(&self, flags: PacketFilterFlags, multicast: &[LinkLayerAddress]) {
        apply_receive_filter(
            &self.regs,
            self.features.mac_address_count(),
            &self.current_address,
            flags,
            multicast,
        );
    }

    // =========================================================================
    // Queue Notification
    // =========================================================================

    /// Register (`Some`) or clear (`None`) the rx notification target.
    pub fn set_notification_rx_queue(&self, queue: Option<Q>) {
        self.irq.set_rx_queue(&self.regs, queue);
    }

    /// Register (`Some`) or clear (`None`) the tx notification target.
    pub fn set_notification_tx_queue(&self, queue: Option<Q>) {
        self.irq.set_tx_queue(&self.regs, queue);
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Interrupt top half; call from the interrupt handler.
    ///
    /// Returns `false` if the interrupt was not for this device.
    pub fn on_interrupt(&self) -> bool {
        self.irq
            .on_interrupt(&self.regs, || self.host.schedule_deferred())
    }

    /// Deferred worker; call when the host runs the work scheduled by
    /// [`on_interrupt`](Self::on_interrupt).
    pub fn on_deferred(&self) {
        self.irq.on_deferred(&self.regs, || {
            refresh_link_state(&self.regs, &self.host);
        });
    }

    /// Interrupt categories currently enabled
    #[inline(always)]
    pub fn interrupts_wanted(&self) -> Interrupts {
        self.irq.wanted()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Address found in hardware at prepare
    #[inline(always)]
    pub fn permanent_address(&self) -> MacAddress {
        self.permanent_address
    }

    /// Address the adapter receives on
    #[inline(always)]
    pub fn current_address(&self) -> MacAddress {
        self.current_address
    }

    /// Version and feature snapshot
    #[inline(always)]
    pub fn features(&self) -> &FeatureCaps {
        &self.features
    }

    /// Negotiated DMA addressing
    #[inline(always)]
    pub fn dma_capabilities(&self) -> DmaCapabilities {
        self.dma
    }

    /// Primary interrupt line
    #[inline(always)]
    pub fn interrupt_line(&self) -> InterruptLine {
        self.interrupt
    }

    /// Register window
    #[inline(always)]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Driver interrupt counters
    pub fn driver_stats(&self) -> DriverStats {
        self.irq.stats()
    }

    /// Hardware statistics counters
    pub fn mmc_stats(&self) -> MmcStats {
        MmcStats::read(&self.regs)
    }
}

impl<R: RegisterBlock, H: Host, Q: QueueNotify> core::fmt::Debug for Device<R, H, Q> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("interrupt", &self.interrupt)
            .field("features", &self.features)
            .field("dma", &self.dma)
            .field("permanent_address", &self.permanent_address)
            .field("current_address", &self.current_address)
            .field("wanted", &self.irq.wanted())
            .field("active", &self.is_active())
            .finish()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::driver::config::{Duplex, LinkSpeed};
    use crate::driver::features::DmaAddressWidth;
    use crate::internal::register::dma::{DMA_CH0_INTERRUPT_ENABLE, DMA_MODE};
    use crate::internal::register::mac::{
        MAC_HW_FEATURE1, MAC_INTERRUPT_ENABLE, MAC_PACKET_FILTER, MAC_PHYIF_CONTROL_STATUS,
        MAC_VERSION, PHYIF_SPEED_125M, mac_address_high, mac_address_low,
    };
    use crate::internal::register::mmc::RX_CRC_ERROR_PACKETS;
    use crate::test_utils::{
        MockDelay, MockHost, MockQueue, SimMapper, SimRegisters, register_window,
        standard_resources,
    };

    type TestDevice<'a> = Device<&'a SimRegisters, &'a MockHost, &'a MockQueue>;

    const PERMANENT: MacAddress = MacAddress::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const RX: u32 = 1 << 6;
    const TX: u32 = 1;
    const FBE: u32 = 1 << 12;
    const AIS: u32 = 1 << 14;

    fn prepare<'a>(host: &'a MockHost, mapper: &mut SimMapper<'a>) -> Result<TestDevice<'a>> {
        Device::prepare_hardware(
            host,
            &HostConfig::new(),
            &standard_resources(),
            mapper,
            MockDelay::new(),
        )
    }

    fn link_up_gigabit(sim: &SimRegisters) {
        sim.set(
            MAC_PHYIF_CONTROL_STATUS.offset(),
            (1 << 19) | (PHYIF_SPEED_125M << 17) | (1 << 16),
        );
    }

    // =========================================================================
    // Prepare Tests
    // =========================================================================

    #[test]
    fn prepare_publishes_and_programs() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);

        let device = prepare(&host, &mut mapper).unwrap();

        assert_eq!(mapper.mapped(), [(0xFE1B_0000, REGISTER_BLOCK_SIZE)]);
        assert_eq!(device.interrupt_line(), InterruptLine { vector: 42 });
        assert_eq!(device.permanent_address(), PERMANENT);
        assert_eq!(device.current_address(), PERMANENT);
        assert_eq!(device.dma_capabilities().width, DmaAddressWidth::Bits40);
        assert_eq!(device.interrupts_wanted(), Interrupts::NONE);
        assert!(!device.is_active());

        let caps = host.capabilities().unwrap();
        assert_eq!(caps.current_address, PERMANENT);
        assert_eq!(caps.permanent_address, PERMANENT);
        assert_eq!(caps.mtu, 1500);
        assert_eq!(caps.link.max_tx_speed_bps, 1_000_000_000);
        assert_eq!(caps.datapath.dma.maximum_physical_address, 0xFF_FFFF_FFFF);
        assert_eq!(caps.datapath.max_tx_fragments, 31);
        assert_eq!(caps.datapath.rx_buffer_size, 2048);
        assert_eq!(caps.datapath.max_dma_mapping_size, 16384);
        assert_eq!(caps.receive_filter.max_multicast_addresses, 3);
        assert!(
            caps.receive_filter
                .supported_filters
                .contains(PacketFilterFlags::MULTICAST)
        );
        assert_eq!(host.link_states(), [LinkState::DISCONNECTED]);
        assert_eq!(host.started(), 1);

        // reset, then slot 0, then bus tuning
        assert_eq!(sim.writes_to(DMA_MODE.offset()), [1]);
        assert_eq!(sim.get(mac_address_high(0).offset()), 0x8000_5544);
        assert_eq!(sim.get(mac_address_low(0).offset()), 0x3322_1102);
        assert_eq!(
            sim.get(DMA_SYSBUS_MODE.offset()),
            (4 << 24) | (8 << 16) | (1 << 14) | 0b1110
        );
        assert_eq!(sim.get(MAC_1US_TIC_COUNTER.offset()), 124);
        assert_eq!(sim.get(DMA_CH0_CONTROL.offset()), (6 << 18) | (1 << 16));
        assert_eq!(sim.get(MMC_CONTROL.offset()), 1);
        assert_eq!(mapper.live(), 1);
    }

    #[test]
    fn bus_mode_keeps_unrelated_bits() {
        let sim = SimRegisters::eqos();
        sim.set(DMA_SYSBUS_MODE.offset(), 0x0000_1001);
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);

        prepare(&host, &mut mapper).unwrap();
        // fixed burst cleared, bit 12 untouched
        assert_eq!(
            sim.get(DMA_SYSBUS_MODE.offset()),
            (4 << 24) | (8 << 16) | (1 << 14) | (1 << 12) | 0b1110
        );
    }

    #[test]
    fn prepare_uses_valid_override() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let config = HostConfig::new().with_mac_address(&[0x0A, 0, 0, 0, 0, 7]);

        let device: TestDevice<'_> = Device::prepare_hardware(
            &host,
            &config,
            &standard_resources(),
            &mut mapper,
            MockDelay::new(),
        )
        .unwrap();

        let current = MacAddress::new([0x0A, 0, 0, 0, 0, 7]);
        assert_eq!(device.current_address(), current);
        assert_eq!(device.permanent_address(), PERMANENT);
        // reset programs the current address
        assert_eq!(sim.get(mac_address_high(0).offset()), 0x8000_0700);
        assert_eq!(sim.get(mac_address_low(0).offset()), 0x0000_000A);
    }

    #[test]
    fn prepare_synthesizes_address_for_blank_part() {
        let sim = SimRegisters::eqos();
        sim.set(mac_address_high(0).offset(), 0);
        sim.set(mac_address_low(0).offset(), 0);
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);

        let device = prepare(&host, &mut mapper).unwrap();
        let b = host.random_byte();
        assert_eq!(device.permanent_address(), MacAddress::ZERO);
        assert_eq!(
            device.current_address(),
            MacAddress::new([0xF2, 0x00, b, b, b, b])
        );
    }

    #[test]
    fn extra_resources_are_ignored() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let resources = [
            Resource::Other { kind: 9 },
            Resource::Memory {
                start: 0x1000,
                length: 0x100,
            },
            Resource::Interrupt { vector: 7 },
            register_window(),
            Resource::Memory {
                start: 0x2000_0000,
                length: 0x1_0000,
            },
            Resource::Interrupt { vector: 8 },
            Resource::Interrupt { vector: 9 },
        ];

        let device: TestDevice<'_> = Device::prepare_hardware(
            &host,
            &HostConfig::new(),
            &resources,
            &mut mapper,
            MockDelay::new(),
        )
        .unwrap();

        assert_eq!(mapper.mapped(), [(0xFE1B_0000, REGISTER_BLOCK_SIZE)]);
        assert_eq!(device.interrupt_line().vector, 7);
    }

    fn prepare_with(
        sim: &SimRegisters,
        resources: &[Resource],
    ) -> (Result<()>, u32, usize) {
        let host = MockHost::new();
        let mut mapper = SimMapper::new(sim);
        let result: Result<TestDevice<'_>> = Device::prepare_hardware(
            &host,
            &HostConfig::new(),
            resources,
            &mut mapper,
            MockDelay::new(),
        );
        (result.map(|_| ()), mapper.unmapped(), mapper.live())
    }

    #[test]
    fn missing_window_is_rejected() {
        let sim = SimRegisters::eqos();
        let (result, unmapped, _) = prepare_with(&sim, &[Resource::Interrupt { vector: 1 }]);
        assert_eq!(result, Err(Error::Config(ConfigError::NoRegisterWindow)));
        assert_eq!(unmapped, 0);
    }

    #[test]
    fn undersized_window_is_rejected() {
        let sim = SimRegisters::eqos();
        let resources = [
            Resource::Memory {
                start: 0x1000,
                length: (REGISTER_BLOCK_SIZE - 4) as u64,
            },
            Resource::Interrupt { vector: 1 },
        ];
        let (result, _, _) = prepare_with(&sim, &resources);
        assert_eq!(result, Err(Error::Config(ConfigError::RegisterWindowTooSmall)));
    }

    #[test]
    fn missing_interrupt_unmaps_window() {
        let sim = SimRegisters::eqos();
        let (result, unmapped, live) = prepare_with(&sim, &[register_window()]);
        assert_eq!(result, Err(Error::Config(ConfigError::NoInterrupt)));
        assert_eq!(unmapped, 1);
        assert_eq!(live, 0);
    }

    #[test]
    fn map_failure_is_reported() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::failing(&sim);
        let result = prepare(&host, &mut mapper);
        assert_eq!(result.err(), Some(Error::Config(ConfigError::MapFailed)));
    }

    #[test]
    fn unsupported_version_unmaps_window() {
        let sim = SimRegisters::eqos();
        sim.set(MAC_VERSION.offset(), 0x0000_1050);
        let (result, unmapped, live) = prepare_with(&sim, &standard_resources());
        assert_eq!(result, Err(Error::Config(ConfigError::UnsupportedVersion)));
        assert_eq!(unmapped, 1);
        assert_eq!(live, 0);
        // nothing programmed
        assert!(sim.writes().is_empty());
    }

    #[test]
    fn unknown_address_width_unmaps_window() {
        let sim = SimRegisters::eqos();
        sim.set(MAC_HW_FEATURE1.offset(), (3 << 14) | (7 << 6) | 7);
        let (result, _, live) = prepare_with(&sim, &standard_resources());
        assert_eq!(result, Err(Error::Config(ConfigError::UnknownAddressWidth)));
        assert_eq!(live, 0);
    }

    #[test]
    fn reset_timeout_aborts_prepare() {
        let sim = SimRegisters::eqos();
        sim.set_reset_busy_polls(u32::MAX);
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);

        let result = prepare(&host, &mut mapper);
        assert_eq!(result.err(), Some(Error::Io(IoError::Timeout)));
        assert_eq!(mapper.live(), 0);
        assert_eq!(host.started(), 0);
        assert!(sim.writes_to(MAC_1US_TIC_COUNTER.offset()).is_empty());
    }

    #[test]
    fn refused_datapath_aborts_prepare() {
        let sim = SimRegisters::eqos();
        let host = MockHost::refusing_start();
        let mut mapper = SimMapper::new(&sim);

        let result = prepare(&host, &mut mapper);
        assert_eq!(result.err(), Some(Error::Config(ConfigError::DatapathStartFailed)));
        assert_eq!(mapper.live(), 0);
    }

    // =========================================================================
    // D0 Tests
    // =========================================================================

    #[test]
    fn d0_entry_programs_steady_state() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        link_up_gigabit(&sim);
        sim.raise_channel(RX | AIS);

        device.d0_entry().unwrap();

        assert_eq!(sim.get(MAC_TX_FLOW_CTRL.offset()), 0xFFFF_0002);
        assert_eq!(sim.get(MTL_TXQ0_OPERATION_MODE.offset()), 0x003F_000A);
        assert_eq!(sim.get(MAC_RX_FLOW_CTRL.offset()), 0x3);
        assert_eq!(sim.get(MAC_RXQ_CTRL0.offset()), 0x2);
        assert_eq!(sim.get(MTL_RXQ0_OPERATION_MODE.offset()), 0x03F2_82B8);
        // DCRS, BE, RE, TE, then full duplex from the link refresh
        assert_eq!(
            sim.writes_to(MAC_CONFIGURATION.offset()),
            [0x0004_0203, 0x0004_2203]
        );

        let link = *host.link_states().last().unwrap();
        assert!(link.connected);
        assert_eq!(link.speed, LinkSpeed::Mbps1000);
        assert_eq!(link.duplex, Duplex::Full);

        // stale status cleared before the state interrupts are enabled
        assert_eq!(sim.get(DMA_CH0_STATUS.offset()), 0);
        assert_eq!(device.interrupts_wanted(), Interrupts::STATE);
        assert_eq!(sim.get(MAC_INTERRUPT_ENABLE.offset()), 1);
        assert_eq!(sim.get(DMA_CH0_INTERRUPT_ENABLE.offset()), 0xD000);
        assert!(device.is_active());
    }

    #[test]
    fn d0_entry_twice_is_rejected() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();

        device.d0_entry().unwrap();
        assert_eq!(device.d0_entry(), Err(Error::Io(IoError::InvalidState)));
    }

    #[test]
    fn d0_exit_without_entry_is_rejected() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();

        assert_eq!(device.d0_exit(), Err(Error::Io(IoError::InvalidState)));
    }

    #[test]
    fn d0_exit_disables_everything() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        link_up_gigabit(&sim);
        device.d0_entry().unwrap();

        device.d0_exit().unwrap();

        assert_eq!(device.interrupts_wanted(), Interrupts::NONE);
        assert_eq!(sim.get(MAC_INTERRUPT_ENABLE.offset()), 0);
        assert_eq!(sim.get(DMA_CH0_INTERRUPT_ENABLE.offset()), 1 << 15);
        let config = MacConfiguration(sim.get(MAC_CONFIGURATION.offset()));
        assert!(!config.receiver_enable());
        assert!(!config.transmitter_enable());
        assert!(config.full_duplex());
        assert!(config.packet_burst_enable());
        assert!(!device.is_active());

        // and back again
        device.d0_entry().unwrap();
        assert_eq!(device.interrupts_wanted(), Interrupts::STATE);
    }

    // =========================================================================
    // Filter and Interrupt Flow Tests
    // =========================================================================

    #[test]
    fn receive_filter_uses_current_address_and_table_size() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        sim.clear_writes();

        let groups = [
            LinkLayerAddress::from_slice(&[0x01, 0x00, 0x5E, 0, 0, 1]).unwrap(),
            LinkLayerAddress::from_slice(&[0x01, 0x00, 0x5E, 0, 0, 2]).unwrap(),
            LinkLayerAddress::from_slice(&[0x01, 0x00, 0x5E, 0, 0, 3]).unwrap(),
            LinkLayerAddress::from_slice(&[0x01, 0x00, 0x5E, 0, 0, 4]).unwrap(),
        ];
        device.set_receive_filter(
            PacketFilterFlags::DIRECTED | PacketFilterFlags::MULTICAST | PacketFilterFlags::BROADCAST,
            &groups,
        );

        assert_eq!(sim.get(mac_address_high(0).offset()), 0x8000_5544);
        assert_eq!(sim.get(mac_address_high(3).offset()), 0x8000_0300);
        // four slots: the fourth group does not fit
        assert!(sim.writes_to(mac_address_high(4).offset()).is_empty());
        assert_eq!(sim.writes().last().unwrap().0, MAC_PACKET_FILTER.offset());
    }

    #[test]
    fn interrupt_to_notification_flow() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        let rxq = MockQueue::new();
        let txq = MockQueue::new();
        device.d0_entry().unwrap();

        device.set_notification_rx_queue(Some(&rxq));
        device.set_notification_tx_queue(Some(&txq));
        assert_eq!(device.interrupts_wanted(), Interrupts::ALL);

        sim.raise_channel(RX);
        assert!(device.on_interrupt());
        assert_eq!(host.scheduled(), 1);

        device.on_deferred();
        assert_eq!(rxq.notifications(), 1);
        assert_eq!(txq.notifications(), 0);
        // rx disarmed until the queue registers again
        assert_eq!(device.interrupts_wanted(), Interrupts::STATE | Interrupts::TX);

        // nothing pending: shared-line interrupt is not ours
        assert!(!device.on_interrupt());
        assert_eq!(host.scheduled(), 1);

        let stats = device.driver_stats();
        assert_eq!(stats.isr_handled, 1);
        assert_eq!(stats.isr_ignored, 1);
        assert_eq!(stats.dpc_rx, 1);

        device.set_notification_tx_queue(None);
        device.d0_exit().unwrap();
    }

    #[test]
    fn link_change_refreshes_host_state() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        device.d0_entry().unwrap();
        let before = host.link_states().len();

        link_up_gigabit(&sim);
        sim.raise_link_change();
        assert!(device.on_interrupt());
        device.on_deferred();

        let states = host.link_states();
        assert_eq!(states.len(), before + 1);
        assert!(states.last().unwrap().connected);
        assert_eq!(device.driver_stats().dpc_link_state, 1);
    }

    #[test]
    fn hardware_errors_are_counted_only() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        device.d0_entry().unwrap();

        sim.raise_channel(AIS | FBE);
        assert!(device.on_interrupt());
        device.on_deferred();

        let stats = device.driver_stats();
        assert_eq!(stats.dpc_abnormal_status, 1);
        assert_eq!(stats.dpc_fatal_bus_error, 1);
        assert_eq!(device.interrupts_wanted(), Interrupts::STATE);
        assert!(device.is_active());
    }

    #[test]
    fn rx_tx_without_handles_are_dropped() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        device.d0_entry().unwrap();

        sim.raise_channel(RX | TX);
        assert!(device.on_interrupt());
        device.on_deferred();

        let stats = device.driver_stats();
        assert_eq!(stats.dpc_rx, 0);
        assert_eq!(stats.dpc_tx, 0);
        assert_eq!(device.interrupts_wanted(), Interrupts::STATE);
    }

    // =========================================================================
    // Release Tests
    // =========================================================================

    #[test]
    fn release_restores_permanent_address() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let config = HostConfig::new().with_mac_address(&[0x0A, 0, 0, 0, 0, 7]);
        let device: TestDevice<'_> = Device::prepare_hardware(
            &host,
            &config,
            &standard_resources(),
            &mut mapper,
            MockDelay::new(),
        )
        .unwrap();
        sim.set(RX_CRC_ERROR_PACKETS.offset(), 3);
        assert_eq!(device.mmc_stats().rx_crc_errors, 3);
        sim.clear_writes();

        device.release_hardware(&mut mapper, MockDelay::new()).unwrap();

        assert_eq!(sim.writes_to(DMA_MODE.offset()), [1]);
        assert_eq!(sim.get(mac_address_high(0).offset()), 0x8000_5544);
        assert_eq!(sim.get(mac_address_low(0).offset()), 0x3322_1102);
        assert_eq!(mapper.live(), 0);
    }

    #[test]
    fn release_unmaps_even_when_reset_hangs() {
        let sim = SimRegisters::eqos();
        let host = MockHost::new();
        let mut mapper = SimMapper::new(&sim);
        let device = prepare(&host, &mut mapper).unwrap();
        sim.set_reset_busy_polls(u32::MAX);

        let result = device.release_hardware(&mut mapper, MockDelay::new());
        assert_eq!(result, Err(Error::Io(IoError::Timeout)));
        assert_eq!(mapper.live(), 0);
    }
}
