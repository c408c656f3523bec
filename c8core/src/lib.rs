#![deny(missing_debug_implementations)]
#![warn(missing_copy_implementations)]

mod address;
pub use address::Address;

mod data;
pub use data::{Datum, Nibble};

mod instruction;
pub use instruction::{Instruction, InstructionDecodeError, RawInstruction};

pub mod control;
pub mod display;
pub mod error;
pub mod interpreter;
pub mod key;
pub mod memory;
pub mod sound;
pub mod stack;

pub use display::{Display, Pixel};
pub use interpreter::Chip8;

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum GeneralRegister {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    VF,
}

impl GeneralRegister {
    pub const ALL: [Self; 16] = [
        Self::V0,
        Self::V1,
        Self::V2,
        Self::V3,
        Self::V4,
        Self::V5,
        Self::V6,
        Self::V7,
        Self::V8,
        Self::V9,
        Self::VA,
        Self::VB,
        Self::VC,
        Self::VD,
        Self::VE,
        Self::VF,
    ];

    /// The register doubling as carry, borrow and collision flag.
    pub const FLAG: Self = Self::VF;

    pub fn from_byte(byte: u8) -> Self {
        assert!(byte < 16, "No general register V{:X}", byte);
        Self::ALL[byte as usize]
    }

    pub fn from_nibble(nibble: Nibble) -> Self {
        Self::ALL[nibble.as_half_byte() as usize]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// `V0` up to and including `self`, in order.
    pub fn through(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().take(self.index() + 1)
    }
}
