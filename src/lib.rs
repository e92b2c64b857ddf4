//! DWC EQOS Control Core
//!
//! A `no_std`, `no_alloc` Rust implementation of the control core for the
//! Synopsys DesignWare Ethernet QoS (EQOS) gigabit MAC.
//!
//! The crate covers hardware bring-up and teardown, interrupt
//! demultiplexing and deferred servicing, link-state detection, and
//! address/filter programming. Descriptor rings and packet buffers belong to
//! the datapath layer of the surrounding network stack, which talks to the
//! core through queue registration hooks.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Device Layer** ([`driver::device`]): lifecycle, filter and interrupt
//!    entry points for one adapter
//! 2. **HAL Layer** ([`hal`]): multi-register hardware sequences (software reset)
//! 3. **Register Layer** ([`registers`]): the register window and typed
//!    bit-field accessors
//!
//! Everything the core needs from the outside goes through three traits:
//! [`Host`], [`RegisterMapper`] and [`QueueNotify`].
//!
//! # Concurrency
//!
//! The interrupt top half ([`Device::on_interrupt`]) only acknowledges
//! causes and merges them into a lock-free pending word. The interrupt mask
//! and the two queue handles live behind a `critical-section` mutex and are
//! only touched for short register-write sequences. The platform must
//! provide a `critical-section` implementation.
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging and formatting for public types
//!
//! # Example
//!
//! ```ignore
//! use dwc_eqos::{Device, HostConfig, PacketFilterFlags};
//!
//! let device = Device::prepare_hardware(&host, &HostConfig::new(), &resources, &mut mapper, delay)?;
//! device.d0_entry()?;
//! device.set_receive_filter(PacketFilterFlags::DIRECTED | PacketFilterFlags::BROADCAST, &[]);
//!
//! // interrupt handler
//! if device.on_interrupt() { /* handled */ }
//!
//! // deferred work scheduled through Host::schedule_deferred
//! device.on_deferred();
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{
    AutoNegotiation, Duplex, HostConfig, InterruptLine, LinkLayerAddress, LinkSpeed, LinkState,
    MacAddress, PacketFilterFlags, Resource,
};
pub use driver::device::Device;
pub use driver::error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use driver::features::{DmaAddressWidth, DmaCapabilities, FeatureCaps};
pub use driver::host::{
    AdapterCapabilities, DatapathCapabilities, Host, LinkCapabilities, QueueNotify,
    ReceiveFilterCapabilities, RegisterMapper,
};
pub use driver::interrupt::{InterruptStatus, Interrupts};
pub use driver::stats::{DriverStats, MmcStats};
pub use internal::register::{Mmio, REGISTER_BLOCK_SIZE, Reg, RegisterBlock};

/// Low-level register definitions for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants such as the interrupt
/// mask bookkeeping. Use only if you accept responsibility for correct
/// sequencing and synchronization with the [`Device`].
pub mod registers {
    pub use crate::internal::register::{
        Mmio, REGISTER_BLOCK_SIZE, Reg, RegisterBlock, dma, mac, mmc, mtl, read_reg, write_reg,
    };
}

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types and integration points.
pub mod constants {
    pub use crate::internal::constants::{
        // MAC address
        MAC_ADDR_LEN,
        // Datapath sizing
        MAX_DMA_MAPPING_SIZE,
        MAX_LINK_LAYER_ADDR_LEN,
        MTU,
        PAUSE_TIME_MAX,
        QUEUE_DESCRIPTOR_MIN_COUNT,
        // Timing
        RESET_POLL_INTERVAL_US,
        RESET_RETRY_COUNT,
        RX_BUFFER_SIZE,
        SYNTHESIZED_MAC_PREFIX,
    };
}
