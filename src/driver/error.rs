//! Error types for the EQOS control core
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: bring-up failures that leave the device non-functional
//! - [`IoError`]: runtime failures (reset timeout, wrong device state)
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by most driver methods. Hardware-reported runtime faults (abnormal
//! interrupt summary, fatal bus error) are never errors: they are counted
//! in [`DriverStats`](crate::DriverStats) and logged.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration and bring-up errors
///
/// Any of these aborts `prepare_hardware` immediately; there is no partial
/// retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No memory window among the resources
    NoRegisterWindow,
    /// Memory windows were offered but none covers the register block
    RegisterWindowTooSmall,
    /// The platform could not map the register window
    MapFailed,
    /// No interrupt line among the resources
    NoInterrupt,
    /// Hardware revision outside the supported range
    UnsupportedVersion,
    /// DMA address width capability not recognized
    UnknownAddressWidth,
    /// The host refused to start the datapath
    DatapathStartFailed,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::NoRegisterWindow => "no register window",
            ConfigError::RegisterWindowTooSmall => "register window too small",
            ConfigError::MapFailed => "register window mapping failed",
            ConfigError::NoInterrupt => "no interrupt line",
            ConfigError::UnsupportedVersion => "unsupported hardware version",
            ConfigError::UnknownAddressWidth => "unknown DMA address width",
            ConfigError::DatapathStartFailed => "datapath start failed",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Software reset did not complete within the retry budget
    Timeout,
    /// Invalid power state for operation
    InvalidState,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid state for operation",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Config(ConfigError::NoInterrupt)) => { /* ... */ }
///     Err(Error::Io(IoError::Timeout)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl core::error::Error for Error {}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for runtime operations
pub type IoResult<T> = core::result::Result<T, IoError>;

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_converts() {
        let e: Error = ConfigError::UnknownAddressWidth.into();
        assert_eq!(e, Error::Config(ConfigError::UnknownAddressWidth));
    }

    #[test]
    fn io_error_converts() {
        let e: Error = IoError::Timeout.into();
        assert_eq!(e, Error::Io(IoError::Timeout));
    }

    #[test]
    fn display_prefixes_domain() {
        assert_eq!(
            format!("{}", Error::from(ConfigError::NoInterrupt)),
            "config: no interrupt line"
        );
        assert_eq!(format!("{}", Error::from(IoError::Timeout)), "io: operation timed out");
    }

    #[test]
    fn question_mark_lifts_domain_errors() {
        fn inner() -> Result<()> {
            let mapped: ConfigResult<()> = Err(ConfigError::MapFailed);
            mapped?;
            Ok(())
        }
        assert_eq!(inner(), Err(Error::Config(ConfigError::MapFailed)));
    }
}
