//! Reset Controller HAL
//!
//! Software reset of the DMA/MAC core. The reset clears the address table,
//! so slot 0 is reprogrammed with the caller's address once the reset bit
//! self-clears.

use embedded_hal::delay::DelayNs;

use crate::driver::config::MacAddress;
use crate::driver::error::{IoError, IoResult};
use crate::driver::filtering::set_one_mac_address;
use crate::internal::constants::{RESET_POLL_INTERVAL_US, RESET_RETRY_COUNT};
use crate::internal::register::RegisterBlock;
use crate::internal::register::dma::{DMA_MODE, DmaMode};

// =============================================================================
// Reset Controller
// =============================================================================

/// Reset controller for the EQOS core
///
/// Polls the self-clearing reset bit with a fixed stall between reads.
#[derive(Debug)]
pub struct ResetController<D: DelayNs> {
    /// Delay provider
    delay: D,
    /// Polls before giving up
    retries: u32,
}

impl<D: DelayNs> ResetController<D> {
    /// Create a new reset controller with the default poll budget
    pub fn new(delay: D) -> Self {
        Self {
            delay,
            retries: RESET_RETRY_COUNT,
        }
    }

    /// Software-reset the core and program address slot 0 with `mac`.
    ///
    /// Each poll stalls first, then reads the reset bit. On success returns
    /// the number of polls used. On timeout the address table is left alone
    /// and `IoError::Timeout` is returned.
    pub fn soft_reset<R: RegisterBlock>(&mut self, regs: &R, mac: &MacAddress) -> IoResult<u32> {
        let mut mode = DmaMode::ZERO;
        mode.set_software_reset(true);
        regs.store(DMA_MODE, mode);

        for poll in 1..=self.retries {
            self.delay.delay_us(RESET_POLL_INTERVAL_US);
            if !regs.load(DMA_MODE).software_reset() {
                set_one_mac_address(regs, 0, mac, true);
                return Ok(poll);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::error!("software reset timed out after {} polls", self.retries);

        Err(IoError::Timeout)
    }

    /// Give the delay provider back
    pub fn release(self) -> D {
        self.delay
    }
}
