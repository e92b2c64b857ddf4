//! Centralized Constants
//!
//! Single source of truth for the magic numbers used by the bring-up and
//! steady-state programming paths.
//!
//! # Note
//!
//! Hardware register bit definitions remain in their respective modules
//! (`register/dma.rs`, `register/mac.rs`, etc.) as they are specific to
//! those hardware blocks.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Standard Ethernet MTU (Maximum Transmission Unit)
pub const MTU: usize = 1500;

/// MAC address length in bytes
pub const MAC_ADDR_LEN: usize = 6;

/// Longest link-layer address the host can hand over
pub const MAX_LINK_LAYER_ADDR_LEN: usize = 32;

/// Receive buffer size advertised to the datapath
pub const RX_BUFFER_SIZE: usize = 2048;

/// Largest single DMA mapping the datapath may request
pub const MAX_DMA_MAPPING_SIZE: usize = 16384;

// =============================================================================
// Descriptor Layout
// =============================================================================

/// Size of one rx/tx descriptor as laid out by the datapath
pub const DESCRIPTOR_SIZE: usize = 64;

/// Size of the hardware-owned part of a descriptor
pub const DESCRIPTOR_HW_SIZE: usize = 16;

/// System bus width in bytes (descriptor skip length unit)
pub const BUS_BYTES: usize = 8;

/// Minimum ring length the datapath allocates
pub const QUEUE_DESCRIPTOR_MIN_COUNT: usize = 32;

/// Burst lengths are programmed in units of 8 beats
pub const QUEUE_BURST_LENGTH_X8: bool = true;

const _: () = assert!(DESCRIPTOR_SIZE.is_multiple_of(BUS_BYTES));

// =============================================================================
// Timing Constants
// =============================================================================

/// Polls of the software-reset bit before giving up
pub const RESET_RETRY_COUNT: u32 = 1000;

/// Stall between reset polls in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 20;

/// CSR (register interface) clock rate in Hz
pub const DEFAULT_CSR_RATE_HZ: u32 = 125_000_000;

// =============================================================================
// Bus Tuning
// =============================================================================

/// AXI maximum outstanding write transactions
pub const DEFAULT_AXI_MAX_WRITE_OUTSTANDING: u32 = 4;

/// AXI maximum outstanding read transactions
pub const DEFAULT_AXI_MAX_READ_OUTSTANDING: u32 = 8;

// =============================================================================
// Flow Control
// =============================================================================

/// Maximum PAUSE time value (in 512-bit-time units)
pub const PAUSE_TIME_MAX: u32 = 0xFFFF;

/// MAC rx flow control: flow control enable plus unicast pause detect
pub const RX_FLOW_CTRL_DEFAULT: u32 = 0x3;

/// Rx queue 0 enabled for generic (DCB) traffic
pub const RXQ0_ENABLE_GENERIC: u32 = 0x2;

/// Rx FIFO flow control activate threshold (full minus 2 KiB)
pub const RX_FLOW_ACTIVATE: u32 = 2;

/// Rx FIFO flow control deactivate threshold (full minus 6 KiB)
pub const RX_FLOW_DEACTIVATE: u32 = 10;

// =============================================================================
// MAC Address
// =============================================================================

/// First two bytes of a synthesized, locally administered unicast address
pub const SYNTHESIZED_MAC_PREFIX: [u8; 2] = [0xF2, 0x00];

// =============================================================================
// Hardware Revisions
// =============================================================================

/// Oldest supported Synopsys core version
pub const MIN_SNPS_VERSION: u32 = 0x51;

/// Newest supported vendor version
pub const MAX_USER_VERSION: u32 = 0x52;

// =============================================================================
// Link Speeds
// =============================================================================

/// 10 Mbps in bits per second
pub const SPEED_10M_BPS: u64 = 10_000_000;
/// 100 Mbps in bits per second
pub const SPEED_100M_BPS: u64 = 100_000_000;
/// 1000 Mbps in bits per second
pub const SPEED_1000M_BPS: u64 = 1_000_000_000;
