use crate::error::{ExecutionError, LoadError};
use crate::{Address, Datum, RawInstruction};
use std::ops::{Index, IndexMut};

pub const NUMBER_OF_ADDRESSES: usize = Address::NUMBER_OF_ADDRESSES;
pub const PROGRAM_CAPACITY: usize = NUMBER_OF_ADDRESSES - Address::PROGRAM_START.as_usize();

#[derive(Debug, Clone, Eq, PartialEq)]
#[allow(missing_copy_implementations)]
pub struct Memory([Datum; NUMBER_OF_ADDRESSES]);

impl Memory {
    /// Zeroed memory with the hexadecimal font in place.
    pub fn new() -> Self {
        let mut inner = [Datum(0); NUMBER_OF_ADDRESSES];
        for (i, byte) in FONT_DATA.iter().enumerate() {
            inner[i + FONT_START_ADDR] = Datum(*byte);
        }
        Self(inner)
    }

    /// Copies a program image to the program area. Nothing is written if it does not fit.
    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.len() > PROGRAM_CAPACITY {
            return Err(LoadError::ProgramTooLarge {
                requested: bytes.len(),
                capacity: PROGRAM_CAPACITY,
            });
        }
        let start = Address::PROGRAM_START.as_usize();
        for (cell, byte) in self.0[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell = Datum(*byte);
        }
        Ok(())
    }

    /// Reads the instruction word at `pc`, which must leave room for both of its bytes.
    pub fn fetch(&self, pc: u16) -> Result<RawInstruction, ExecutionError> {
        let at = pc as usize;
        match (self.0.get(at), self.0.get(at + 1)) {
            (Some(&high), Some(&low)) => Ok(RawInstruction::from((high, low))),
            _ => Err(ExecutionError::OutOfBounds { pc }),
        }
    }

    /// `number` consecutive bytes from `start`, wrapping round at the top of memory.
    pub fn substring(&self, start: Address, number: u8) -> Vec<Datum> {
        (0..number as u16).map(|i| self[start.offset(i)]).collect()
    }

    pub fn all(&self) -> &[Datum] {
        &self.0[..]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Address> for Memory {
    type Output = Datum;

    fn index(&self, index: Address) -> &Self::Output {
        &self.0[index.as_usize()]
    }
}

impl IndexMut<Address> for Memory {
    fn index_mut(&mut self, index: Address) -> &mut Self::Output {
        &mut self.0[index.as_usize()]
    }
}

pub const FONT_START_ADDR: usize = 0x000;
pub const GLYPH_SIZE: u16 = 5;

/// `digit * 5`. Past `F` this points beyond the font table, into whatever follows it.
pub fn glyph_address(digit: Datum) -> u16 {
    FONT_START_ADDR as u16 + digit.inner() as u16 * GLYPH_SIZE
}

const FONT_DATA: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
