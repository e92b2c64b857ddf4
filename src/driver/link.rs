//! Link state tracking
//!
//! The PHY interface status register reports what the PHY negotiated. On
//! every refresh the MAC's duplex and port speed are brought in line with it
//! and the result is published to the host.

use crate::driver::config::{AutoNegotiation, Duplex, LinkSpeed, LinkState};
use crate::driver::host::Host;
use crate::internal::register::RegisterBlock;
use crate::internal::register::mac::{
    MAC_CONFIGURATION, MAC_PHYIF_CONTROL_STATUS, MacConfiguration, MacPhyIfControlStatus,
    PHYIF_SPEED_2_5M, PHYIF_SPEED_25M, PHYIF_SPEED_125M, PORT_SELECT_SPEED_10M,
    PORT_SELECT_SPEED_100M, PORT_SELECT_SPEED_1000M,
};

impl LinkSpeed {
    /// Decode the PHY interface speed code
    pub const fn from_phyif(code: u32) -> Self {
        match code {
            PHYIF_SPEED_2_5M => LinkSpeed::Mbps10,
            PHYIF_SPEED_25M => LinkSpeed::Mbps100,
            PHYIF_SPEED_125M => LinkSpeed::Mbps1000,
            _ => LinkSpeed::Unknown,
        }
    }

    /// MAC port speed selector for this speed
    pub const fn port_select(self) -> Option<u32> {
        match self {
            LinkSpeed::Mbps10 => Some(PORT_SELECT_SPEED_10M),
            LinkSpeed::Mbps100 => Some(PORT_SELECT_SPEED_100M),
            LinkSpeed::Mbps1000 => Some(PORT_SELECT_SPEED_1000M),
            LinkSpeed::Unknown => None,
        }
    }
}

/// Decode the PHY interface status into a link state.
///
/// Speed and duplex are always reported as auto-negotiated.
pub fn decode_link_state(status: MacPhyIfControlStatus) -> LinkState {
    LinkState {
        connected: status.link_up(),
        duplex: if status.full_duplex() {
            Duplex::Full
        } else {
            Duplex::Half
        },
        speed: LinkSpeed::from_phyif(status.speed()),
        auto_negotiation: AutoNegotiation::ALL,
    }
}

/// MAC configuration matching `status`.
///
/// Duplex is copied; an unknown speed leaves the port selector unchanged.
pub fn reconcile_mac_configuration(
    current: MacConfiguration,
    status: MacPhyIfControlStatus,
) -> MacConfiguration {
    let mut config = current;
    config.set_full_duplex(status.full_duplex());
    if let Some(ps) = LinkSpeed::from_phyif(status.speed()).port_select() {
        config.set_port_select_speed(ps);
    }
    config
}

/// Read the PHY interface status, update the MAC and publish the link state.
///
/// Reading the status register acknowledges the link-change interrupt. The
/// MAC configuration is written only if it changed.
pub fn refresh_link_state<R: RegisterBlock, H: Host>(regs: &R, host: &H) -> LinkState {
    let status = regs.load(MAC_PHYIF_CONTROL_STATUS);
    let old_config = regs.load(MAC_CONFIGURATION);
    let new_config = reconcile_mac_configuration(old_config, status);

    if new_config != old_config {
        regs.store(MAC_CONFIGURATION, new_config);
    }

    let state = decode_link_state(status);
    host.set_link_state(&state);

    #[cfg(feature = "defmt")]
    defmt::info!(
        "link: phyif={=u32:#x} mac config {=u32:#x} -> {=u32:#x} up={} speed={=u64}",
        status.bits(),
        old_config.bits(),
        new_config.bits(),
        state.connected,
        state.speed_bps()
    );

    state
}
