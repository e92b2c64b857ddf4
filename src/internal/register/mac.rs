//! MAC Register Definitions
//!
//! MAC core configuration, flow control, interrupt, PHY interface status,
//! version/feature discovery and the perfect address filter table.

use super::{Reg, reg_type};

// =============================================================================
// Register Offsets
// =============================================================================

/// MAC Configuration Register
pub const MAC_CONFIGURATION: Reg<MacConfiguration> = Reg::at(0x0000);
/// MAC Packet Filter Register
pub const MAC_PACKET_FILTER: Reg<MacPacketFilter> = Reg::at(0x0008);
/// MAC Queue 0 Transmit Flow Control Register
pub const MAC_TX_FLOW_CTRL: Reg<MacTxFlowCtrl> = Reg::at(0x0070);
/// MAC Receive Flow Control Register
pub const MAC_RX_FLOW_CTRL: Reg<u32> = Reg::at(0x0090);
/// MAC Receive Queue Control 0 Register
pub const MAC_RXQ_CTRL0: Reg<u32> = Reg::at(0x00A0);
/// MAC Interrupt Status Register
pub const MAC_INTERRUPT_STATUS: Reg<MacInterruptStatus> = Reg::at(0x00B0);
/// MAC Interrupt Enable Register
pub const MAC_INTERRUPT_ENABLE: Reg<MacInterruptEnable> = Reg::at(0x00B4);
/// MAC 1us Tick Counter Register
pub const MAC_1US_TIC_COUNTER: Reg<u32> = Reg::at(0x00DC);
/// MAC PHY Interface Control/Status Register (read clears the link status interrupt)
pub const MAC_PHYIF_CONTROL_STATUS: Reg<MacPhyIfControlStatus> = Reg::at(0x00F8);
/// MAC Version Register
pub const MAC_VERSION: Reg<MacVersion> = Reg::at(0x0110);
/// MAC Hardware Feature 0 Register
pub const MAC_HW_FEATURE0: Reg<MacHwFeature0> = Reg::at(0x011C);
/// MAC Hardware Feature 1 Register
pub const MAC_HW_FEATURE1: Reg<MacHwFeature1> = Reg::at(0x0120);
/// MAC Hardware Feature 2 Register
pub const MAC_HW_FEATURE2: Reg<u32> = Reg::at(0x0124);
/// MAC Hardware Feature 3 Register
pub const MAC_HW_FEATURE3: Reg<u32> = Reg::at(0x0128);

/// Address table base (slot 0 high word)
pub const MAC_ADDRESS_BASE: usize = 0x0300;
/// Stride between address table slots
pub const MAC_ADDRESS_STRIDE: usize = 8;

/// High word of address table slot `index`
pub const fn mac_address_high(index: usize) -> Reg<MacAddressHigh> {
    Reg::at(MAC_ADDRESS_BASE + index * MAC_ADDRESS_STRIDE)
}

/// Low word of address table slot `index`
pub const fn mac_address_low(index: usize) -> Reg<MacAddressLow> {
    Reg::at(MAC_ADDRESS_BASE + index * MAC_ADDRESS_STRIDE + 4)
}

// =============================================================================
// Field Definitions
// =============================================================================

/// `port_select_speed` encoding for 1000 Mbps (PS=0, FES=0)
pub const PORT_SELECT_SPEED_1000M: u32 = 0b00;
/// `port_select_speed` encoding for 10 Mbps (PS=1, FES=0)
pub const PORT_SELECT_SPEED_10M: u32 = 0b10;
/// `port_select_speed` encoding for 100 Mbps (PS=1, FES=1)
pub const PORT_SELECT_SPEED_100M: u32 = 0b11;

reg_type! {
    /// MAC Configuration Register
    MacConfiguration {
        flags {
            /// RE - receiver enable
            receiver_enable, set_receiver_enable: 0;
            /// TE - transmitter enable
            transmitter_enable, set_transmitter_enable: 1;
            /// DCRS - disable carrier sense during transmission
            disable_carrier_sense_during_transmit, set_disable_carrier_sense_during_transmit: 9;
            /// DM - full duplex mode
            full_duplex, set_full_duplex: 13;
            /// BE - packet burst enable
            packet_burst_enable, set_packet_burst_enable: 18;
        }
        fields {
            /// FES (bit 14) and PS (bit 15) as one speed selector
            port_select_speed, set_port_select_speed: 14, 2;
        }
    }
}

reg_type! {
    /// MAC Packet Filter Register
    MacPacketFilter {
        flags {
            /// PR - promiscuous mode
            promiscuous_mode, set_promiscuous_mode: 0;
            /// PM - pass all multicast
            pass_all_multicast, set_pass_all_multicast: 4;
            /// DBF - disable broadcast packets
            disable_broadcast, set_disable_broadcast: 5;
        }
        fields {}
    }
}

reg_type! {
    /// MAC Queue 0 Transmit Flow Control Register
    MacTxFlowCtrl {
        flags {
            /// TFE - transmit flow control enable
            transmit_flow_control_enable, set_transmit_flow_control_enable: 1;
        }
        fields {
            /// PT - pause time
            pause_time, set_pause_time: 16, 16;
        }
    }
}

reg_type! {
    /// MAC Interrupt Status Register
    MacInterruptStatus {
        flags {
            /// RGSMIIIS - link status changed
            link_status, set_link_status: 0;
        }
        fields {}
    }
}

reg_type! {
    /// MAC Interrupt Enable Register
    MacInterruptEnable {
        flags {
            /// RGSMIIIE - link status interrupt enable
            link_status, set_link_status: 0;
        }
        fields {}
    }
}

/// LNKSPEED encoding: 2.5 MHz transmit clock (10 Mbps)
pub const PHYIF_SPEED_2_5M: u32 = 0;
/// LNKSPEED encoding: 25 MHz transmit clock (100 Mbps)
pub const PHYIF_SPEED_25M: u32 = 1;
/// LNKSPEED encoding: 125 MHz transmit clock (1000 Mbps)
pub const PHYIF_SPEED_125M: u32 = 2;

reg_type! {
    /// MAC PHY Interface Control/Status Register
    MacPhyIfControlStatus {
        flags {
            /// LNKMOD - full duplex link
            full_duplex, set_full_duplex: 16;
            /// LNKSTS - link up
            link_up, set_link_up: 19;
        }
        fields {
            /// LNKSPEED - link clock code
            speed, set_speed: 17, 2;
        }
    }
}

reg_type! {
    /// MAC Version Register
    MacVersion {
        flags {}
        fields {
            /// SNPSVER - Synopsys core version
            snps_ver, set_snps_ver: 0, 8;
            /// USERVER - vendor version
            user_ver, set_user_ver: 8, 8;
        }
    }
}

reg_type! {
    /// MAC Hardware Feature 0 Register
    MacHwFeature0 {
        flags {
            /// GMIISEL - 1000 Mbps support
            gmii, set_gmii: 1;
        }
        fields {
            /// ADDMACADRSEL - address table size
            mac_addr_count, set_mac_addr_count: 18, 5;
        }
    }
}

/// ADDR64 encoding: 32-bit DMA addressing
pub const ADDRESS_WIDTH_32: u32 = 0;
/// ADDR64 encoding: 40-bit DMA addressing
pub const ADDRESS_WIDTH_40: u32 = 1;
/// ADDR64 encoding: 48-bit DMA addressing
pub const ADDRESS_WIDTH_48: u32 = 2;

reg_type! {
    /// MAC Hardware Feature 1 Register
    MacHwFeature1 {
        flags {}
        fields {
            /// RXFIFOSIZE - rx FIFO size as `128 << n` bytes
            rx_fifo_size, set_rx_fifo_size: 0, 5;
            /// TXFIFOSIZE - tx FIFO size as `128 << n` bytes
            tx_fifo_size, set_tx_fifo_size: 6, 5;
            /// ADDR64 - DMA address width
            address_width, set_address_width: 14, 2;
        }
    }
}

reg_type! {
    /// MAC Address High Register (slot n)
    MacAddressHigh {
        flags {
            /// AE - address enable
            address_enable, set_address_enable: 31;
        }
        fields {
            /// Address byte 4
            addr4, set_addr4: 0, 8;
            /// Address byte 5
            addr5, set_addr5: 8, 8;
        }
    }
}

reg_type! {
    /// MAC Address Low Register (slot n)
    MacAddressLow {
        flags {}
        fields {
            /// Address byte 0
            addr0, set_addr0: 0, 8;
            /// Address byte 1
            addr1, set_addr1: 8, 8;
            /// Address byte 2
            addr2, set_addr2: 16, 8;
            /// Address byte 3
            addr3, set_addr3: 24, 8;
        }
    }
}

impl MacAddressLow {
    /// Pack address bytes 0..4
    pub fn from_address(addr: &[u8; 6]) -> Self {
        Self(u32::from_le_bytes([addr[0], addr[1], addr[2], addr[3]]))
    }
}

impl MacAddressHigh {
    /// Pack address bytes 4..6 and the enable bit
    pub fn from_address(addr: &[u8; 6], enable: bool) -> Self {
        let mut hi = Self(u32::from(addr[4]) | (u32::from(addr[5]) << 8));
        hi.set_address_enable(enable);
        hi
    }
}

/// Unpack an address table slot into its six bytes.
pub fn unpack_address(hi: MacAddressHigh, lo: MacAddressLow) -> [u8; 6] {
    [
        lo.addr0() as u8,
        lo.addr1() as u8,
        lo.addr2() as u8,
        lo.addr3() as u8,
        hi.addr4() as u8,
        hi.addr5() as u8,
    ]
}
