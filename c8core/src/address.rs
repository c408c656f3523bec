use crate::data::{impl_fmt, Nibble};
use std::cmp::Ordering;

/// A location in the 12-bit address space.
#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Address(u16);

impl Address {
    pub const MAX: Self = Self(u16::MAX >> 4);
    pub const NUMBER_OF_ADDRESSES: usize = (Self::MAX.0 + 1) as usize;
    pub const ZERO: Self = Self(0);
    pub const PROGRAM_START: Self = Self(0x200);

    pub fn new(at: u16) -> Self {
        assert!(at <= Self::MAX.0, "Address 0x{:X} is out of range", at);
        Self(at)
    }

    /// Drops everything above the low twelve bits.
    pub fn wrapping(at: u16) -> Self {
        Self(at & Self::MAX.0)
    }

    pub fn from_triplet(high: Nibble, mid: Nibble, low: Nibble) -> Self {
        let inner = ((high.as_half_byte() as u16) << 8)
            | ((mid.as_half_byte() as u16) << 4)
            | low.as_half_byte() as u16;
        Self(inner)
    }

    /// Moves `by` bytes forward, wrapping round at the top of memory.
    pub fn offset(self, by: u16) -> Self {
        Self::wrapping(self.0.wrapping_add(by))
    }

    pub const fn as_u16(self) -> u16 {
        self.0
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl PartialEq<u16> for Address {
    fn eq(&self, other: &u16) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<u16> for Address {
    fn partial_cmp(&self, other: &u16) -> Option<Ordering> {
        self.0.partial_cmp(other)
    }
}

impl From<Address> for usize {
    fn from(value: Address) -> Self {
        value.0.into()
    }
}

impl From<Address> for u16 {
    fn from(value: Address) -> Self {
        value.0
    }
}

impl_fmt! {
    (Address, u16),
    std::fmt::LowerHex,
    std::fmt::UpperHex,
    std::fmt::Octal,
    std::fmt::Binary
}
