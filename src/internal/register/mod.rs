//! Memory-mapped register definitions for the EQOS MAC
//!
//! The register window is a single fixed-layout block located at prepare
//! time. Access goes through the [`RegisterBlock`] trait so the driver can run
//! against real MMIO ([`Mmio`]) or a register-file simulator in tests.
//!
//! Each register with named fields gets an accessor type generated by
//! [`reg_type!`]: a `u32` newtype with getters and chaining setters that keep
//! the exact shift/width of every field.

pub mod dma;
pub mod mac;
pub mod mmc;
pub mod mtl;

use core::marker::PhantomData;

/// Size of the register window the driver needs mapped, in bytes.
///
/// The DMA channel 0 block is the last one used and ends at `0x1180`.
pub const REGISTER_BLOCK_SIZE: usize = 0x1200;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Block Access
// =============================================================================

/// Typed register location inside the register window.
///
/// `T` is the accessor type the register is loaded into.
#[derive(Debug)]
pub struct Reg<T> {
    offset: usize,
    _ty: PhantomData<T>,
}

impl<T> Reg<T> {
    /// Register at `offset` bytes from the start of the window.
    pub const fn at(offset: usize) -> Self {
        Self {
            offset,
            _ty: PhantomData,
        }
    }

    /// Byte offset inside the register window.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<T> Clone for Reg<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Reg<T> {}

/// Fixed-width load/store access to the register window.
///
/// Offsets are byte offsets, always 4-byte aligned and below
/// [`REGISTER_BLOCK_SIZE`]. Implementations must not cache.
pub trait RegisterBlock {
    /// Load the 32-bit register at `offset`.
    fn read32(&self, offset: usize) -> u32;

    /// Store `value` into the 32-bit register at `offset`.
    fn write32(&self, offset: usize, value: u32);

    /// Load a register into its accessor type.
    #[inline(always)]
    fn load<T: From<u32>>(&self, reg: Reg<T>) -> T {
        T::from(self.read32(reg.offset))
    }

    /// Store an accessor value into its register.
    #[inline(always)]
    fn store<T: Into<u32>>(&self, reg: Reg<T>, value: T) {
        self.write32(reg.offset, value.into());
    }
}

impl<B: RegisterBlock + ?Sized> RegisterBlock for &B {
    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    #[inline(always)]
    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }
}

/// Volatile access to a mapped register window.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Wrap a mapped, uncached register window.
    ///
    /// # Safety
    ///
    /// `base` must point to a mapping of at least [`REGISTER_BLOCK_SIZE`]
    /// bytes of device memory that stays valid for the lifetime of the
    /// returned value, and must be 4-byte aligned.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl RegisterBlock for Mmio {
    #[inline(always)]
    fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset < REGISTER_BLOCK_SIZE && offset.is_multiple_of(4));
        // SAFETY: `new` guarantees the window covers REGISTER_BLOCK_SIZE bytes
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write32(&self, offset: usize, value: u32) {
        debug_assert!(offset < REGISTER_BLOCK_SIZE && offset.is_multiple_of(4));
        // SAFETY: `new` guarantees the window covers REGISTER_BLOCK_SIZE bytes
        unsafe { write_reg(self.base + offset, value) }
    }
}

// SAFETY: MMIO accesses are single volatile loads/stores; the hardware
// serializes them.
unsafe impl Send for Mmio {}
// SAFETY: see above
unsafe impl Sync for Mmio {}

// =============================================================================
// Register Accessor Macro
// =============================================================================

/// Generate a bit-field accessor type for a 32-bit register.
///
/// `flags` are single-bit fields read as `bool`; `fields` are multi-bit
/// fields given as `lsb, width` (width below 32).
///
/// # Example
/// ```ignore
/// reg_type! {
///     /// DMA mode register
///     DmaMode {
///         flags {
///             software_reset, set_software_reset: 0;
///         }
///         fields {}
///     }
/// }
/// ```
macro_rules! reg_type {
    (
        $(#[$meta:meta])*
        $name:ident {
            flags {
                $( $(#[$fmeta:meta])* $fget:ident, $fset:ident : $bit:literal; )*
            }
            fields {
                $( $(#[$vmeta:meta])* $vget:ident, $vset:ident : $lsb:literal, $width:literal; )*
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name(pub u32);

        #[allow(dead_code)]
        impl $name {
            /// All fields zero
            pub const ZERO: Self = Self(0);

            /// Raw register value
            #[inline(always)]
            pub const fn bits(self) -> u32 {
                self.0
            }

            $(
                $(#[$fmeta])*
                #[inline(always)]
                pub const fn $fget(self) -> bool {
                    self.0 & (1u32 << $bit) != 0
                }

                #[doc = concat!("Set or clear `", stringify!($fget), "`")]
                #[inline(always)]
                pub fn $fset(&mut self, on: bool) -> &mut Self {
                    if on {
                        self.0 |= 1u32 << $bit;
                    } else {
                        self.0 &= !(1u32 << $bit);
                    }
                    self
                }
            )*

            $(
                $(#[$vmeta])*
                #[inline(always)]
                pub const fn $vget(self) -> u32 {
                    (self.0 >> $lsb) & ((1u32 << $width) - 1)
                }

                #[doc = concat!("Write `", stringify!($vget), "` (excess high bits are dropped)")]
                #[inline(always)]
                pub fn $vset(&mut self, value: u32) -> &mut Self {
                    let mask = ((1u32 << $width) - 1) << $lsb;
                    self.0 = (self.0 & !mask) | ((value << $lsb) & mask);
                    self
                }
            )*
        }

        impl From<u32> for $name {
            #[inline(always)]
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u32 {
            #[inline(always)]
            fn from(value: $name) -> u32 {
                value.0
            }
        }
    };
}

pub(crate) use reg_type;
