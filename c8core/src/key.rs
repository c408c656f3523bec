use crate::Datum;
use std::ops::{BitAnd, BitOrAssign};

pub const NUMBER_OF_KEYS: u8 = 16;

/// The hexadecimal keypad, one bit per key.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Keys(u16);

impl Keys {
    pub const NONE: Self = Self(0);

    pub fn from_raw(raw: [bool; 16]) -> Self {
        let mut s = Self::NONE;
        for (i, &item) in raw.iter().enumerate() {
            if item {
                s |= nth_shift(i);
            }
        }
        s
    }

    /// Panics if `key` is not on the keypad.
    pub fn from_number(key: u8) -> Self {
        assert!(key < NUMBER_OF_KEYS, "There is no key {:X}", key);
        nth_shift(key as usize)
    }

    pub fn press(&mut self, key: u8) {
        *self |= Self::from_number(key);
    }

    pub fn release(&mut self, key: u8) {
        self.0 &= !Self::from_number(key).0;
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        (*self & Self::from_number(key)).pressed()
    }

    /// Checks the key named by a register. Values past `F` name no key and are never down.
    pub fn holds(&self, datum: Datum) -> bool {
        datum.inner() < NUMBER_OF_KEYS && self.is_pressed(datum.inner())
    }

    /// Whether any key is down.
    pub fn pressed(&self) -> bool {
        self.0 != 0
    }

    pub fn to_raw(self) -> [bool; 16] {
        let mut raw = [false; 16];
        for (i, slot) in raw.iter_mut().enumerate() {
            *slot = self.0 & nth_shift(i).0 != 0;
        }
        raw
    }
}

impl BitOrAssign for Keys {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Keys {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

const fn nth_shift(n: usize) -> Keys {
    Keys(0b1 << n)
}
