//! Perfect address filtering for the EQOS MAC.
//!
//! Slot 0 of the address table holds the adapter's own unicast address.
//! The remaining slots hold multicast entries from the host's list, in
//! order. Entries past the end of the list are zeroed and disabled.
//!
//! Multicast groups beyond the table size are not received unless
//! all-multicast is requested; hash filtering is not used.

use crate::driver::config::{LinkLayerAddress, MacAddress, PacketFilterFlags};
use crate::internal::register::RegisterBlock;
use crate::internal::register::mac::{
    MAC_PACKET_FILTER, MacAddressHigh, MacAddressLow, MacPacketFilter, mac_address_high,
    mac_address_low,
};

/// Program one address table slot.
///
/// The high word (with the enable bit) is written before the low word.
pub fn set_one_mac_address<R: RegisterBlock>(
    regs: &R,
    index: usize,
    addr: &MacAddress,
    enable: bool,
) {
    regs.store(
        mac_address_high(index),
        MacAddressHigh::from_address(addr.octets(), enable),
    );
    regs.store(
        mac_address_low(index),
        MacAddressLow::from_address(addr.octets()),
    );
}

/// Apply a receive filter request.
///
/// Promiscuous mode only sets the promiscuous bit; the address table is
/// left as is. Otherwise slot 0 gets `current` (enabled iff directed
/// delivery is requested), slots `1..table_size` get the multicast list
/// (only consulted when the multicast flag is set), and the packet filter
/// register is written last.
pub fn apply_receive_filter<R: RegisterBlock>(
    regs: &R,
    table_size: usize,
    current: &MacAddress,
    flags: PacketFilterFlags,
    multicast: &[LinkLayerAddress],
) {
    let multicast = if flags.contains(PacketFilterFlags::MULTICAST) {
        multicast
    } else {
        &[]
    };

    let mut filter = MacPacketFilter::ZERO;
    if flags.contains(PacketFilterFlags::PROMISCUOUS) {
        filter.set_promiscuous_mode(true);
    } else {
        filter
            .set_pass_all_multicast(flags.contains(PacketFilterFlags::ALL_MULTICAST))
            .set_disable_broadcast(!flags.contains(PacketFilterFlags::BROADCAST));

        // The hardware may keep matching slot 0 even when disabled
        set_one_mac_address(
            regs,
            0,
            current,
            flags.contains(PacketFilterFlags::DIRECTED),
        );

        for slot in 1..table_size {
            // entries shorter than an Ethernet address are skipped
            let entry = multicast.get(slot - 1).and_then(LinkLayerAddress::ethernet);
            match entry {
                Some(addr) => set_one_mac_address(regs, slot, &addr, true),
                None => set_one_mac_address(regs, slot, &MacAddress::ZERO, false),
            }
        }
    }

    regs.store(MAC_PACKET_FILTER, filter);

    #[cfg(feature = "defmt")]
    defmt::info!(
        "receive filter flags={=u32:#x} multicast={=usize}",
        flags.0,
        multicast.len()
    );
}
