//! Configuration and value types shared with the host layer

use core::ops::BitOr;

use crate::internal::constants::{
    MAC_ADDR_LEN, MAX_LINK_LAYER_ADDR_LEN, SPEED_10M_BPS, SPEED_100M_BPS, SPEED_1000M_BPS,
};

// =============================================================================
// Addresses
// =============================================================================

/// A 48-bit Ethernet MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; MAC_ADDR_LEN]);

impl MacAddress {
    /// `00:00:00:00:00:00`
    pub const ZERO: Self = Self([0; MAC_ADDR_LEN]);
    /// `FF:FF:FF:FF:FF:FF`
    pub const BROADCAST: Self = Self([0xFF; MAC_ADDR_LEN]);

    /// Create from raw bytes
    pub const fn new(bytes: [u8; MAC_ADDR_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes
    pub const fn octets(&self) -> &[u8; MAC_ADDR_LEN] {
        &self.0
    }

    /// Group (multicast) bit set. Broadcast is also multicast.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// All ones
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// All zeros
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Locally administered bit set
    pub const fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl From<[u8; MAC_ADDR_LEN]> for MacAddress {
    fn from(bytes: [u8; MAC_ADDR_LEN]) -> Self {
        Self(bytes)
    }
}

/// Variable-length link-layer address as handed over by the host.
///
/// Holds up to 32 bytes. Only entries of exactly 6 bytes are usable as a
/// unicast override; multicast list entries need at least 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkLayerAddress {
    bytes: [u8; MAX_LINK_LAYER_ADDR_LEN],
    len: u8,
}

impl LinkLayerAddress {
    /// Copy an address; `None` if longer than 32 bytes.
    pub fn from_slice(addr: &[u8]) -> Option<Self> {
        if addr.len() > MAX_LINK_LAYER_ADDR_LEN {
            return None;
        }
        let mut bytes = [0u8; MAX_LINK_LAYER_ADDR_LEN];
        bytes[..addr.len()].copy_from_slice(addr);
        Some(Self {
            bytes,
            len: addr.len() as u8,
        })
    }

    /// Address length in bytes
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// True if the address has no bytes
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// First six bytes, if the address is at least that long
    pub fn ethernet(&self) -> Option<MacAddress> {
        if self.len() < MAC_ADDR_LEN {
            return None;
        }
        let mut mac = [0u8; MAC_ADDR_LEN];
        mac.copy_from_slice(&self.bytes[..MAC_ADDR_LEN]);
        Some(MacAddress(mac))
    }
}

impl From<MacAddress> for LinkLayerAddress {
    fn from(mac: MacAddress) -> Self {
        let mut bytes = [0u8; MAX_LINK_LAYER_ADDR_LEN];
        bytes[..MAC_ADDR_LEN].copy_from_slice(&mac.0);
        Self {
            bytes,
            len: MAC_ADDR_LEN as u8,
        }
    }
}

// =============================================================================
// Host Configuration
// =============================================================================

/// Host-supplied configuration read at prepare time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostConfig {
    /// Network address override from the adapter configuration store
    pub mac_address: Option<LinkLayerAddress>,
}

impl HostConfig {
    /// Configuration with no overrides
    pub const fn new() -> Self {
        Self { mac_address: None }
    }

    /// Set the network address override.
    ///
    /// The override is validated at prepare time; addresses longer than 32
    /// bytes are dropped here.
    #[must_use]
    pub fn with_mac_address(mut self, addr: &[u8]) -> Self {
        self.mac_address = LinkLayerAddress::from_slice(addr);
        self
    }
}

// =============================================================================
// Platform Resources
// =============================================================================

/// A hardware resource assigned to the device by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resource {
    /// Memory-mapped register window
    Memory {
        /// Physical start address
        start: u64,
        /// Window length in bytes
        length: u64,
    },
    /// Interrupt line
    Interrupt {
        /// Platform interrupt vector
        vector: u32,
    },
    /// Anything else (ignored)
    Other {
        /// Platform resource type code
        kind: u8,
    },
}

/// The interrupt line the device services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptLine {
    /// Platform interrupt vector
    pub vector: u32,
}

// =============================================================================
// Receive Filter
// =============================================================================

/// Receive packet filter flags requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketFilterFlags(pub u32);

impl PacketFilterFlags {
    /// Nothing requested
    pub const NONE: Self = Self(0);
    /// Unicast packets to the current address
    pub const DIRECTED: Self = Self(1 << 0);
    /// Multicast packets to the supplied list
    pub const MULTICAST: Self = Self(1 << 1);
    /// All multicast packets
    pub const ALL_MULTICAST: Self = Self(1 << 2);
    /// Broadcast packets
    pub const BROADCAST: Self = Self(1 << 3);
    /// Everything on the wire
    pub const PROMISCUOUS: Self = Self(1 << 5);

    /// True if every flag in `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for PacketFilterFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// =============================================================================
// Link State
// =============================================================================

/// Negotiated link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkSpeed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    Mbps100,
    /// 1000 Mbps
    Mbps1000,
    /// Not decodable from hardware status
    #[default]
    Unknown,
}

impl LinkSpeed {
    /// Speed in bits per second; 0 when unknown
    pub const fn bits_per_second(self) -> u64 {
        match self {
            LinkSpeed::Mbps10 => SPEED_10M_BPS,
            LinkSpeed::Mbps100 => SPEED_100M_BPS,
            LinkSpeed::Mbps1000 => SPEED_1000M_BPS,
            LinkSpeed::Unknown => 0,
        }
    }
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    Full,
    /// Not known (link down before first status read)
    #[default]
    Unknown,
}

/// Which link parameters were auto-negotiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoNegotiation {
    /// Transmit speed was negotiated
    pub tx_speed: bool,
    /// Receive speed was negotiated
    pub rx_speed: bool,
    /// Duplex was negotiated
    pub duplex: bool,
}

impl AutoNegotiation {
    /// Nothing negotiated
    pub const NONE: Self = Self {
        tx_speed: false,
        rx_speed: false,
        duplex: false,
    };

    /// Speed and duplex negotiated in both directions
    pub const ALL: Self = Self {
        tx_speed: true,
        rx_speed: true,
        duplex: true,
    };
}

/// Link state published to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkState {
    /// Media connected
    pub connected: bool,
    /// Duplex mode
    pub duplex: Duplex,
    /// Link speed
    pub speed: LinkSpeed,
    /// Auto-negotiation flags
    pub auto_negotiation: AutoNegotiation,
}

impl LinkState {
    /// Disconnected, nothing known
    pub const DISCONNECTED: Self = Self {
        connected: false,
        duplex: Duplex::Unknown,
        speed: LinkSpeed::Unknown,
        auto_negotiation: AutoNegotiation::NONE,
    };

    /// Reported speed in bits per second (0 when unknown)
    pub const fn speed_bps(&self) -> u64 {
        self.speed.bits_per_second()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_classification() {
        assert!(MacAddress::BROADCAST.is_broadcast());
        assert!(MacAddress::BROADCAST.is_multicast());
        assert!(MacAddress::ZERO.is_zero());
        assert!(MacAddress::new([0x01, 0x00, 0x5E, 0, 0, 1]).is_multicast());
        assert!(!MacAddress::new([0x02, 0, 0, 0, 0, 1]).is_multicast());
        assert!(MacAddress::new([0x02, 0, 0, 0, 0, 1]).is_local());
    }

    #[test]
    fn link_layer_address_lengths() {
        let short = LinkLayerAddress::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(short.len(), 3);
        assert_eq!(short.ethernet(), None);

        let long = LinkLayerAddress::from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(long.ethernet(), Some(MacAddress::new([1, 2, 3, 4, 5, 6])));

        assert!(LinkLayerAddress::from_slice(&[0u8; 33]).is_none());
    }

    #[test]
    fn host_config_builder() {
        let cfg = HostConfig::new().with_mac_address(&[0x02, 0, 0, 0, 0, 9]);
        let addr = cfg.mac_address.unwrap();
        assert_eq!(addr.as_bytes(), &[0x02, 0, 0, 0, 0, 9]);
        assert_eq!(HostConfig::new(), HostConfig::default());
    }

    #[test]
    fn packet_filter_flags_combine() {
        let flags = PacketFilterFlags::DIRECTED | PacketFilterFlags::BROADCAST;
        assert!(flags.contains(PacketFilterFlags::DIRECTED));
        assert!(flags.contains(PacketFilterFlags::BROADCAST));
        assert!(!flags.contains(PacketFilterFlags::PROMISCUOUS));
    }

    #[test]
    fn link_speed_rates() {
        assert_eq!(LinkSpeed::Mbps10.bits_per_second(), 10_000_000);
        assert_eq!(LinkSpeed::Mbps100.bits_per_second(), 100_000_000);
        assert_eq!(LinkSpeed::Mbps1000.bits_per_second(), 1_000_000_000);
        assert_eq!(LinkSpeed::Unknown.bits_per_second(), 0);
        assert_eq!(LinkState::DISCONNECTED.speed_bps(), 0);
    }
}
