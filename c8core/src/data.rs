use std::ops::{BitAnd, BitOr, BitXor};

/// One byte, as held in a register or a memory cell.
#[derive(Debug, Copy, Clone, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Datum(pub u8);

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Nibble(u8);

impl Datum {
    pub fn as_nibbles(self) -> [Nibble; 2] {
        [
            Nibble::new_from_half_byte(self.0 >> 4),
            Nibble::new_from_half_byte(self.0 & 0b1111),
        ]
    }

    /// Counts down by one unless already at zero. Returns whether it moved.
    pub fn towards_zero(&mut self) -> bool {
        match self.0.checked_sub(1) {
            Some(lower) => {
                self.0 = lower;
                true
            }
            None => false,
        }
    }

    pub fn inner(self) -> u8 {
        self.0
    }

    pub fn wrapping_add(self, rhs: u8) -> Self {
        Self(self.0.wrapping_add(rhs))
    }

    /// Sum modulo 256, and whether it carried out of eight bits.
    pub fn carrying_add(self, rhs: Self) -> (Self, bool) {
        let (sum, carry) = self.0.overflowing_add(rhs.0);
        (Self(sum), carry)
    }

    /// Difference modulo 256, and whether it went through *without* a borrow.
    pub fn sub_no_borrow(self, rhs: Self) -> (Self, bool) {
        (Self(self.0.wrapping_sub(rhs.0)), self.0 >= rhs.0)
    }

    /// Halves the value, returning the bit shifted out.
    pub fn shift_right(self) -> (Self, bool) {
        (Self(self.0 >> 1), self.0 & 0b1 != 0)
    }

    /// Doubles the value modulo 256, returning the bit shifted out.
    pub fn shift_left(self) -> (Self, bool) {
        (Self(self.0 << 1), (self.0 >> 7) & 0b1 != 0)
    }

    /// Hundreds, tens and ones digits.
    pub fn bcd(self) -> [Datum; 3] {
        [Self(self.0 / 100), Self((self.0 / 10) % 10), Self(self.0 % 10)]
    }

    /// Pixels of a sprite row, most significant bit first.
    pub fn bits(self) -> [bool; 8] {
        let mut bits = [false; 8];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = self.0 & (0b1000_0000 >> i) != 0;
        }
        bits
    }
}

impl From<bool> for Datum {
    fn from(flag: bool) -> Self {
        Self(flag as u8)
    }
}

impl Nibble {
    /// Panics if `byte` uses its high nibble.
    pub fn new_from_half_byte(byte: u8) -> Self {
        assert!(byte <= 0xF, "{:#04X} does not fit in a nibble", byte);
        Self(byte)
    }

    pub fn as_half_byte(&self) -> u8 {
        self.0
    }
}

impl BitOr<Datum> for Datum {
    type Output = Self;

    fn bitor(self, rhs: Datum) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd<Datum> for Datum {
    type Output = Self;

    fn bitand(self, rhs: Datum) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAnd<u8> for Datum {
    type Output = Self;

    fn bitand(self, rhs: u8) -> Self::Output {
        Self(self.0 & rhs)
    }
}

impl BitXor<Datum> for Datum {
    type Output = Self;

    fn bitxor(self, rhs: Datum) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

macro_rules! impl_fmt {
    (($ty:ty, $inner:ty), $tr:path) => {
        impl $tr for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                <$inner as $tr>::fmt(&self.0, f)
            }
        }
    };
    (($ty:ty, $inner:ty), $($tr:path),+) => {
        $(
            impl_fmt!(($ty, $inner), $tr);
        )+
    }
}

pub(crate) use impl_fmt;

impl_fmt!(
    (Datum, u8),
    std::fmt::LowerHex,
    std::fmt::UpperHex,
    std::fmt::Octal,
    std::fmt::Binary
);
