//! MMC (statistics counter) register offsets.

use super::Reg;

/// MMC Control Register
pub const MMC_CONTROL: Reg<u32> = Reg::at(0x0700);
/// CNTRST - reset all counters
pub const MMC_CONTROL_COUNTER_RESET: u32 = 1 << 0;

/// Tx packets, good and bad
pub const TX_PACKET_COUNT_GOOD_BAD: Reg<u32> = Reg::at(0x0718);
/// Tx packets aborted by underflow
pub const TX_UNDERFLOW_ERROR_PACKETS: Reg<u32> = Reg::at(0x0748);
/// Tx packets aborted by carrier sense errors
pub const TX_CARRIER_ERROR_PACKETS: Reg<u32> = Reg::at(0x0760);
/// Tx packets, good only
pub const TX_PACKET_COUNT_GOOD: Reg<u32> = Reg::at(0x0768);
/// Tx pause packets
pub const TX_PAUSE_PACKETS: Reg<u32> = Reg::at(0x0770);
/// Rx packets, good and bad
pub const RX_PACKET_COUNT_GOOD_BAD: Reg<u32> = Reg::at(0x0780);
/// Rx packets with CRC errors
pub const RX_CRC_ERROR_PACKETS: Reg<u32> = Reg::at(0x0794);
/// Rx packets with length errors
pub const RX_LENGTH_ERROR_PACKETS: Reg<u32> = Reg::at(0x07C8);
/// Rx pause packets
pub const RX_PAUSE_PACKETS: Reg<u32> = Reg::at(0x07D0);
/// Rx packets dropped by FIFO overflow
pub const RX_FIFO_OVERFLOW_PACKETS: Reg<u32> = Reg::at(0x07D4);
/// Rx packets with watchdog errors
pub const RX_WATCHDOG_ERROR_PACKETS: Reg<u32> = Reg::at(0x07DC);
