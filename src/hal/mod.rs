//! Hardware Abstraction Layer
//!
//! Higher-level sequences over the raw registers.
//!
//! # Modules
//!
//! - [`reset`]: Software reset of the EQOS core
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod reset;

pub use reset::ResetController;
