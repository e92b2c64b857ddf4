//! MTL (MAC Transaction Layer) Register Definitions
//!
//! Per-queue FIFO sizing, store-and-forward and flow-control watermarks.
//! Only queue 0 is used.

use super::{Reg, reg_type};

/// MTL Tx Queue 0 Operation Mode Register
pub const MTL_TXQ0_OPERATION_MODE: Reg<MtlTxOperationMode> = Reg::at(0x0D00);
/// MTL Rx Queue 0 Operation Mode Register
pub const MTL_RXQ0_OPERATION_MODE: Reg<MtlRxOperationMode> = Reg::at(0x0D30);

/// TXQEN encoding: queue enabled
pub const MTL_TX_QUEUE_ENABLED: u32 = 0b10;

reg_type! {
    /// MTL Tx Queue Operation Mode Register
    MtlTxOperationMode {
        flags {
            /// TSF - transmit store and forward
            store_and_forward, set_store_and_forward: 1;
        }
        fields {
            /// TXQEN - queue enable
            queue_enable, set_queue_enable: 2, 2;
            /// TQS - queue size in 256-byte blocks, minus one
            queue_size, set_queue_size: 16, 9;
        }
    }
}

reg_type! {
    /// MTL Rx Queue Operation Mode Register
    MtlRxOperationMode {
        flags {
            /// FUP - forward undersized good packets
            forward_undersized_good_packets, set_forward_undersized_good_packets: 3;
            /// FEP - forward error packets
            forward_error_packets, set_forward_error_packets: 4;
            /// RSF - receive store and forward
            store_and_forward, set_store_and_forward: 5;
            /// EHFC - hardware flow control
            hardware_flow_control, set_hardware_flow_control: 7;
        }
        fields {
            /// RFA - flow control activate threshold
            flow_control_activate, set_flow_control_activate: 8, 6;
            /// RFD - flow control deactivate threshold
            flow_control_deactivate, set_flow_control_deactivate: 14, 6;
            /// RQS - queue size in 256-byte blocks, minus one
            queue_size, set_queue_size: 20, 10;
        }
    }
}

/// Queue size field value using the whole FIFO.
///
/// `fifo_size_code` is the capability encoding (`128 << n` bytes).
pub const fn fifo_queue_size(fifo_size_code: u32) -> u32 {
    ((128u32 << fifo_size_code) / 256).saturating_sub(1)
}
