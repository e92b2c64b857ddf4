//! DMA Controller Register Definitions
//!
//! The DMA block holds the global mode/bus registers and the per-channel
//! control, interrupt-enable and status registers. Only channel 0 is used.

use super::{Reg, reg_type};

// =============================================================================
// Register Offsets
// =============================================================================

/// DMA Mode Register
pub const DMA_MODE: Reg<DmaMode> = Reg::at(0x1000);
/// DMA System Bus Mode Register
pub const DMA_SYSBUS_MODE: Reg<DmaSysBusMode> = Reg::at(0x1004);
/// DMA Channel 0 Control Register
pub const DMA_CH0_CONTROL: Reg<ChannelDmaControl> = Reg::at(0x1100);
/// DMA Channel 0 Interrupt Enable Register
pub const DMA_CH0_INTERRUPT_ENABLE: Reg<ChannelInterruptEnable> = Reg::at(0x1134);
/// DMA Channel 0 Status Register (write 1 to clear)
pub const DMA_CH0_STATUS: Reg<ChannelStatus> = Reg::at(0x1160);

// =============================================================================
// Field Definitions
// =============================================================================

reg_type! {
    /// DMA Mode Register
    DmaMode {
        flags {
            /// SWR - software reset, self-clearing
            software_reset, set_software_reset: 0;
        }
        fields {}
    }
}

reg_type! {
    /// DMA System Bus Mode Register
    DmaSysBusMode {
        flags {
            /// FB - fixed burst length
            fixed_burst, set_fixed_burst: 0;
            /// BLEN4 - 4-beat bursts allowed
            burst_length4, set_burst_length4: 1;
            /// BLEN8 - 8-beat bursts allowed
            burst_length8, set_burst_length8: 2;
            /// BLEN16 - 16-beat bursts allowed
            burst_length16, set_burst_length16: 3;
            /// MB - mixed burst
            mixed_burst, set_mixed_burst: 14;
        }
        fields {
            /// RD_OSR_LMT - AXI maximum outstanding reads
            axi_max_read_outstanding, set_axi_max_read_outstanding: 16, 4;
            /// WR_OSR_LMT - AXI maximum outstanding writes
            axi_max_write_outstanding, set_axi_max_write_outstanding: 24, 4;
        }
    }
}

reg_type! {
    /// DMA Channel Control Register
    ChannelDmaControl {
        flags {
            /// PBLx8 - multiply programmed burst lengths by 8
            pbl_x8, set_pbl_x8: 16;
        }
        fields {
            /// DSL - words to skip between descriptors
            descriptor_skip_length, set_descriptor_skip_length: 18, 3;
        }
    }
}

reg_type! {
    /// DMA Channel Interrupt Enable Register
    ChannelInterruptEnable {
        flags {
            /// TIE - transmit interrupt enable
            tx, set_tx: 0;
            /// RIE - receive interrupt enable
            rx, set_rx: 6;
            /// FBEE - fatal bus error enable
            fatal_bus_error, set_fatal_bus_error: 12;
            /// AIE - abnormal interrupt summary enable
            abnormal_interrupt_summary, set_abnormal_interrupt_summary: 14;
            /// NIE - normal interrupt summary enable
            normal_interrupt_summary, set_normal_interrupt_summary: 15;
        }
        fields {}
    }
}

reg_type! {
    /// DMA Channel Status Register
    ChannelStatus {
        flags {
            /// TI - transmit interrupt
            tx, set_tx: 0;
            /// TPS - transmit process stopped
            tx_stopped, set_tx_stopped: 1;
            /// TBU - transmit buffer unavailable
            tx_buffer_unavailable, set_tx_buffer_unavailable: 2;
            /// RI - receive interrupt
            rx, set_rx: 6;
            /// RBU - receive buffer unavailable
            rx_buffer_unavailable, set_rx_buffer_unavailable: 7;
            /// RPS - receive process stopped
            rx_stopped, set_rx_stopped: 8;
            /// RWT - receive watchdog timeout
            rx_watchdog, set_rx_watchdog: 9;
            /// FBE - fatal bus error
            fatal_bus_error, set_fatal_bus_error: 12;
            /// AIS - abnormal interrupt summary
            abnormal_interrupt_summary, set_abnormal_interrupt_summary: 14;
            /// NIS - normal interrupt summary
            normal_interrupt_summary, set_normal_interrupt_summary: 15;
        }
        fields {
            /// TEB - transmit bus error type
            tx_error_bits, set_tx_error_bits: 16, 3;
            /// REB - receive bus error type
            rx_error_bits, set_rx_error_bits: 19, 3;
        }
    }
}

/// Mask of every channel status bit the hardware can set
pub const CHANNEL_STATUS_MASK: u32 = 0x003F_FFFF;
