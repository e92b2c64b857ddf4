//! Permanent and current MAC address selection
//!
//! The permanent address is whatever firmware left in address slot 0. The
//! current address is the host override when it is a valid unicast
//! address, else the permanent address with two fixups:
//!
//! - an all-zero or all-ones address is replaced by a random locally
//!   administered one (`F2:00:xx:xx:xx:xx`)
//! - a multicast address gets its group bit cleared

use crate::driver::config::{LinkLayerAddress, MacAddress};
use crate::internal::constants::{MAC_ADDR_LEN, SYNTHESIZED_MAC_PREFIX};
use crate::internal::register::RegisterBlock;
use crate::internal::register::mac::{mac_address_high, mac_address_low, unpack_address};

/// Read the address programmed into slot 0.
pub fn read_permanent_address<R: RegisterBlock>(regs: &R) -> MacAddress {
    let hi = regs.load(mac_address_high(0));
    let lo = regs.load(mac_address_low(0));
    MacAddress(unpack_address(hi, lo))
}

/// Accept a host override only if it is a 6-byte unicast address.
pub fn validate_override(addr: &LinkLayerAddress) -> Option<MacAddress> {
    if addr.len() != MAC_ADDR_LEN {
        #[cfg(feature = "defmt")]
        defmt::warn!("address override has bad length {=usize}", addr.len());
        return None;
    }
    let mac = addr.ethernet()?;
    if mac.is_multicast() || mac.is_broadcast() {
        #[cfg(feature = "defmt")]
        defmt::warn!("address override is not unicast: {}", mac);
        return None;
    }
    Some(mac)
}

/// Pick the current address.
///
/// A valid override is used verbatim, including the all-zero address. The
/// fixups only apply to the permanent address. `fill_random` is only called
/// when a replacement address must be synthesized.
pub fn select_current_address(
    override_addr: Option<&LinkLayerAddress>,
    permanent: MacAddress,
    fill_random: impl FnOnce(&mut [u8]),
) -> MacAddress {
    if let Some(mac) = override_addr.and_then(validate_override) {
        #[cfg(feature = "defmt")]
        defmt::info!("using configured address {}", mac);
        return mac;
    }

    let mut current = permanent;
    if current.is_zero() || current.is_broadcast() {
        #[cfg(feature = "defmt")]
        defmt::warn!("permanent address {} unusable, synthesizing", permanent);
        current.0[..2].copy_from_slice(&SYNTHESIZED_MAC_PREFIX);
        fill_random(&mut current.0[2..]);
    } else if current.is_multicast() {
        #[cfg(feature = "defmt")]
        defmt::warn!("permanent address {} is multicast, clearing group bit", permanent);
        current.0[0] &= !0x01;
    }
    current
}
