//! Host integration seams
//!
//! The control core never talks to an operating system directly. Everything
//! it needs from the surrounding network stack goes through these traits:
//!
//! - [`Host`]: publish link state and capabilities, start the datapath,
//!   entropy for address synthesis, scheduling of the deferred worker
//! - [`RegisterMapper`]: map and unmap the register window
//! - [`QueueNotify`]: wake a datapath queue that has work pending

use crate::driver::config::{LinkState, MacAddress, PacketFilterFlags};
use crate::driver::features::DmaCapabilities;
use crate::internal::register::RegisterBlock;

// =============================================================================
// Capabilities
// =============================================================================

/// Link capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkCapabilities {
    /// Maximum transmit speed in bits per second
    pub max_tx_speed_bps: u64,
    /// Maximum receive speed in bits per second
    pub max_rx_speed_bps: u64,
}

/// Datapath capabilities handed to the queue layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DatapathCapabilities {
    /// DMA addressing limits
    pub dma: DmaCapabilities,
    /// Largest single DMA mapping
    pub max_dma_mapping_size: usize,
    /// Fragments a single transmit packet may span
    pub max_tx_fragments: usize,
    /// Receive buffer size
    pub rx_buffer_size: usize,
}

/// Receive filter capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiveFilterCapabilities {
    /// Multicast entries the perfect filter can hold
    pub max_multicast_addresses: u32,
    /// Filter flags the hardware honors
    pub supported_filters: PacketFilterFlags,
}

/// Everything published to the host at the end of prepare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdapterCapabilities {
    /// Address the adapter receives on
    pub current_address: MacAddress,
    /// Address read from hardware
    pub permanent_address: MacAddress,
    /// Maximum transmission unit
    pub mtu: usize,
    /// Link capabilities
    pub link: LinkCapabilities,
    /// Datapath capabilities
    pub datapath: DatapathCapabilities,
    /// Receive filter capabilities
    pub receive_filter: ReceiveFilterCapabilities,
}

// =============================================================================
// Traits
// =============================================================================

/// Services the surrounding network stack provides to the device.
///
/// All methods take `&self`: they are called from the deferred worker and
/// from host-serialized control paths concurrently. `schedule_deferred` is
/// called from interrupt context and must not block.
pub trait Host {
    /// Publish a new link state.
    fn set_link_state(&self, state: &LinkState);

    /// Publish adapter capabilities.
    fn set_capabilities(&self, caps: &AdapterCapabilities);

    /// Start the datapath. Returns `false` if the host refused.
    fn start_datapath(&self) -> bool;

    /// Fill `buf` with random bytes.
    fn fill_random(&self, buf: &mut [u8]);

    /// Queue the deferred worker. Repeated calls before it runs coalesce.
    fn schedule_deferred(&self);
}

impl<T: Host + ?Sized> Host for &T {
    fn set_link_state(&self, state: &LinkState) {
        (**self).set_link_state(state);
    }

    fn set_capabilities(&self, caps: &AdapterCapabilities) {
        (**self).set_capabilities(caps);
    }

    fn start_datapath(&self) -> bool {
        (**self).start_datapath()
    }

    fn fill_random(&self, buf: &mut [u8]) {
        (**self).fill_random(buf);
    }

    fn schedule_deferred(&self) {
        (**self).schedule_deferred();
    }
}

/// Maps the device register window.
pub trait RegisterMapper {
    /// Register access over the mapped window
    type Block: RegisterBlock;

    /// Map `length` bytes at physical address `start`.
    fn map(&mut self, start: u64, length: usize) -> Option<Self::Block>;

    /// Release a mapping obtained from [`map`](Self::map).
    fn unmap(&mut self, block: Self::Block);
}

/// A datapath queue that can be told more work is available.
pub trait QueueNotify {
    /// Signal that the queue should poll again.
    fn notify_more_available(&self);
}

impl<T: QueueNotify + ?Sized> QueueNotify for &T {
    fn notify_more_available(&self) {
        (**self).notify_more_available();
    }
}
