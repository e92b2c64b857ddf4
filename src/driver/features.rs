//! Hardware version and feature discovery
//!
//! The version and the four feature words are read once during prepare and
//! drive everything that depends on the synthesized configuration: address
//! table size, FIFO sizes, gigabit support and DMA address width.

use crate::driver::config::PacketFilterFlags;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::driver::host::{LinkCapabilities, ReceiveFilterCapabilities};
use crate::internal::constants::{
    MAX_USER_VERSION, MIN_SNPS_VERSION, SPEED_100M_BPS, SPEED_1000M_BPS,
};
use crate::internal::register::RegisterBlock;
use crate::internal::register::mac::{
    ADDRESS_WIDTH_32, ADDRESS_WIDTH_40, ADDRESS_WIDTH_48, MAC_HW_FEATURE0, MAC_HW_FEATURE1,
    MAC_HW_FEATURE2, MAC_HW_FEATURE3, MAC_VERSION, MacHwFeature0, MacHwFeature1, MacVersion,
};

/// Snapshot of the version and hardware feature registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FeatureCaps {
    /// Version register
    pub version: MacVersion,
    /// Hardware feature 0
    pub feature0: MacHwFeature0,
    /// Hardware feature 1
    pub feature1: MacHwFeature1,
    /// Hardware feature 2 (raw)
    pub feature2: u32,
    /// Hardware feature 3 (raw)
    pub feature3: u32,
}

impl FeatureCaps {
    /// Read the version and feature registers.
    pub fn read<R: RegisterBlock>(regs: &R) -> Self {
        Self {
            version: regs.load(MAC_VERSION),
            feature0: regs.load(MAC_HW_FEATURE0),
            feature1: regs.load(MAC_HW_FEATURE1),
            feature2: regs.load(MAC_HW_FEATURE2),
            feature3: regs.load(MAC_HW_FEATURE3),
        }
    }

    /// Reject revisions outside `0x51 ..` core / `..= 0x52` vendor.
    pub fn check_version(&self) -> ConfigResult<()> {
        let snps = self.version.snps_ver();
        let user = self.version.user_ver();
        if snps < MIN_SNPS_VERSION || user > MAX_USER_VERSION {
            #[cfg(feature = "defmt")]
            defmt::error!("unsupported EQOS version snps={=u32:#x} user={=u32:#x}", snps, user);
            return Err(ConfigError::UnsupportedVersion);
        }
        Ok(())
    }

    /// Size of the address filter table (slot 0 plus additional slots).
    pub fn mac_address_count(&self) -> usize {
        self.feature0.mac_addr_count() as usize
    }

    /// Gigabit (GMII) support
    pub fn supports_gigabit(&self) -> bool {
        self.feature0.gmii()
    }

    /// Tx FIFO size code (`128 << n` bytes)
    pub fn tx_fifo_size_code(&self) -> u32 {
        self.feature1.tx_fifo_size()
    }

    /// Rx FIFO size code (`128 << n` bytes)
    pub fn rx_fifo_size_code(&self) -> u32 {
        self.feature1.rx_fifo_size()
    }

    /// Negotiate the DMA address width.
    pub fn dma_capabilities(&self) -> ConfigResult<DmaCapabilities> {
        let width = DmaAddressWidth::from_capability(self.feature1.address_width())
            .ok_or(ConfigError::UnknownAddressWidth)?;
        Ok(DmaCapabilities::new(width))
    }

    /// 1 Gbps with GMII, 100 Mbps otherwise; symmetric.
    pub fn link_capabilities(&self) -> LinkCapabilities {
        let speed = if self.supports_gigabit() {
            SPEED_1000M_BPS
        } else {
            SPEED_100M_BPS
        };
        LinkCapabilities {
            max_tx_speed_bps: speed,
            max_rx_speed_bps: speed,
        }
    }

    /// Every table slot after slot 0 can hold a multicast entry.
    pub fn receive_filter_capabilities(&self) -> ReceiveFilterCapabilities {
        let count = self.feature0.mac_addr_count();
        let max_multicast_addresses = count.saturating_sub(1);

        let mut supported_filters = PacketFilterFlags::DIRECTED
            | PacketFilterFlags::ALL_MULTICAST
            | PacketFilterFlags::BROADCAST
            | PacketFilterFlags::PROMISCUOUS;
        if max_multicast_addresses > 0 {
            supported_filters = supported_filters | PacketFilterFlags::MULTICAST;
        }

        ReceiveFilterCapabilities {
            max_multicast_addresses,
            supported_filters,
        }
    }
}

/// DMA address width supported by the core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaAddressWidth {
    /// 32-bit addressing
    Bits32,
    /// 40-bit addressing
    Bits40,
    /// 48-bit addressing
    Bits48,
}

impl DmaAddressWidth {
    /// Decode the feature register encoding
    pub const fn from_capability(code: u32) -> Option<Self> {
        match code {
            ADDRESS_WIDTH_32 => Some(Self::Bits32),
            ADDRESS_WIDTH_40 => Some(Self::Bits40),
            ADDRESS_WIDTH_48 => Some(Self::Bits48),
            _ => None,
        }
    }

    /// Width in bits
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits32 => 32,
            Self::Bits40 => 40,
            Self::Bits48 => 48,
        }
    }

    /// Highest reachable physical address
    pub const fn max_physical_address(self) -> u64 {
        (1u64 << self.bits()) - 1
    }
}

/// DMA addressing limits advertised to the datapath
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DmaCapabilities {
    /// Negotiated width
    pub width: DmaAddressWidth,
    /// Highest physical address a descriptor or buffer may use
    pub maximum_physical_address: u64,
}

impl DmaCapabilities {
    /// Capabilities for `width`
    pub const fn new(width: DmaAddressWidth) -> Self {
        Self {
            width,
            maximum_physical_address: width.max_physical_address(),
        }
    }
}
