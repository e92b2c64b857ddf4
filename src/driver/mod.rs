//! Core driver components for the EQOS MAC.
//!
//! This module contains the building blocks of the control core:
//!
//! - [`device`] - The [`Device`] lifecycle and the glue between the parts
//! - [`interrupt`] - Interrupt mask, top half and deferred worker
//! - [`link`] - Link state refresh
//! - [`filtering`] - Address table and packet filter programming
//! - [`address`] - Permanent and current address selection
//! - [`features`] - Version and capability discovery
//! - [`host`] - Traits the surrounding network stack implements
//! - [`config`] - Value types shared with the host
//! - [`stats`] - Driver and hardware counters
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```ignore
//! use dwc_eqos::driver::{Device, HostConfig};
//!
//! let config = HostConfig::new().with_mac_address(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! let device = Device::prepare_hardware(host, &config, &resources, &mut mapper, delay)?;
//! ```

// Submodules
pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod features;
pub mod filtering;
pub mod host;
pub mod interrupt;
pub mod link;
pub mod stats;

// Re-exports for convenience
pub use config::{
    AutoNegotiation, Duplex, HostConfig, InterruptLine, LinkLayerAddress, LinkSpeed, LinkState,
    MacAddress, PacketFilterFlags, Resource,
};
pub use device::Device;
pub use error::{ConfigError, ConfigResult, Error, IoError, IoResult, Result};
pub use features::{DmaAddressWidth, DmaCapabilities, FeatureCaps};
pub use host::{
    AdapterCapabilities, DatapathCapabilities, Host, LinkCapabilities, QueueNotify,
    ReceiveFilterCapabilities, RegisterMapper,
};
pub use interrupt::{InterruptCoordinator, InterruptStatus, Interrupts};
pub use stats::{DriverStats, MmcStats};
