use crate::data::Nibble;
use crate::{Address, Datum, GeneralRegister as VX};
use thiserror::Error;

/// One decoded instruction word. Each variant names its opcode pattern.
///
/// Unless noted otherwise an instruction moves the program counter on by one
/// instruction; the skips move it on by two when their condition holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Instruction {
    /// `00E0`: blank the display.
    ClearScreen,
    /// `00EE`: pop a call site and resume just after it.
    Return,
    /// `1NNN`
    Jump(Address),
    /// `2NNN`: push the address of this instruction, then jump.
    Call(Address),
    /// `3XNN`: skip when `VX == NN`.
    SkipIfEqual(VX, u8),
    /// `4XNN`: skip when `VX != NN`.
    SkipNotEqual(VX, u8),
    /// `5XY0`: skip when `VX == VY`.
    SkipRegistersEqual(VX, VX),
    /// `6XNN`
    LoadRegByte(VX, u8),
    /// `7XNN`: wrapping add, `VF` untouched.
    Add(VX, u8),
    /// `8XY0`
    CopyRegToReg { x: VX, y: VX },
    /// `8XY1`
    Or { x: VX, y: VX },
    /// `8XY2`
    And { x: VX, y: VX },
    /// `8XY3`
    Xor { x: VX, y: VX },
    /// `8XY4`: `VF` is the carry.
    AddReg { x: VX, y: VX },
    /// `8XY5`: `VX -= VY`, `VF` is set when nothing was borrowed.
    Sub { x: VX, y: VX },
    /// `8XY6`: `VF` is the bit shifted out. `Y` is ignored.
    Shr(VX),
    /// `8XY7`: `VX = VY - VX`, `VF` is set when nothing was borrowed.
    SubN { x: VX, y: VX },
    /// `8XYE`: `VF` is the bit shifted out. `Y` is ignored.
    Shl(VX),
    /// `9XY0`: skip when `VX != VY`.
    SkipRegistersNotEqual(VX, VX),
    /// `ANNN`: `I = NNN`.
    LoadImmediate(Address),
    /// `BNNN`: jump to `NNN + V0`.
    JumpRelative(Address),
    /// `CXNN`: a random byte masked by `NN`.
    Random(VX, u8),
    /// `DXYN`: XOR the `N` rows at `I` onto the screen at `(VX, VY)`, wrapping at the edges.
    /// `VF` is set if any lit pixel went dark.
    DisplaySprite { x: VX, y: VX, number_of_bytes: u8 },
    /// `EX9E`
    SkipPressed(VX),
    /// `EXA1`
    SkipNotPressed(VX),
    /// `FX07`
    GetDelayTimer(VX),
    /// `FX0A`: suspend until a key is pressed and store it in `VX`.
    /// The program counter only moves once the key arrives.
    WaitForKey(VX),
    /// `FX15`
    SetDelayTimer(VX),
    /// `FX18`
    SetSoundTimer(VX),
    /// `FX1E`: `I += VX`, `VF` is set when `I` leaves the address space.
    AddI(VX),
    /// `FX29`: point `I` at the font glyph for `VX`.
    GetSprite(VX),
    /// `FX33`: hundreds, tens and units of `VX` to `I`, `I + 1` and `I + 2`.
    BCD(VX),
    /// `FX55`: store `V0..=VX` from `I` onwards.
    WriteMultiple(VX),
    /// `FX65`: load `V0..=VX` from `I` onwards.
    ReadMultiple(VX),
}

impl Instruction {
    pub fn try_from_data(data: RawInstruction) -> Result<Self, InstructionDecodeError> {
        let nibbles = data.as_nibbles();
        let [_, x, y, _] = nibbles.map(VX::from_nibble);
        let address = || Address::from_triplet(nibbles[1], nibbles[2], nibbles[3]);
        let byte = data.second().inner();

        match nibbles.map(|n| n.as_half_byte()) {
            [0x0, 0x0, 0xE, 0x0] => Ok(Self::ClearScreen),
            [0x0, 0x0, 0xE, 0xE] => Ok(Self::Return),
            [0x1, _, _, _] => Ok(Self::Jump(address())),
            [0x2, _, _, _] => Ok(Self::Call(address())),
            [0x3, _, _, _] => Ok(Self::SkipIfEqual(x, byte)),
            [0x4, _, _, _] => Ok(Self::SkipNotEqual(x, byte)),
            [0x5, _, _, 0x0] => Ok(Self::SkipRegistersEqual(x, y)),
            [0x6, _, _, _] => Ok(Self::LoadRegByte(x, byte)),
            [0x7, _, _, _] => Ok(Self::Add(x, byte)),
            [0x8, _, _, 0x0] => Ok(Self::CopyRegToReg { x, y }),
            [0x8, _, _, 0x1] => Ok(Self::Or { x, y }),
            [0x8, _, _, 0x2] => Ok(Self::And { x, y }),
            [0x8, _, _, 0x3] => Ok(Self::Xor { x, y }),
            [0x8, _, _, 0x4] => Ok(Self::AddReg { x, y }),
            [0x8, _, _, 0x5] => Ok(Self::Sub { x, y }),
            [0x8, _, _, 0x6] => Ok(Self::Shr(x)),
            [0x8, _, _, 0x7] => Ok(Self::SubN { x, y }),
            [0x8, _, _, 0xE] => Ok(Self::Shl(x)),
            [0x9, _, _, 0x0] => Ok(Self::SkipRegistersNotEqual(x, y)),
            [0xA, _, _, _] => Ok(Self::LoadImmediate(address())),
            [0xB, _, _, _] => Ok(Self::JumpRelative(address())),
            [0xC, _, _, _] => Ok(Self::Random(x, byte)),
            [0xD, _, _, n] => Ok(Self::DisplaySprite {
                x,
                y,
                number_of_bytes: n,
            }),
            [0xE, _, 0x9, 0xE] => Ok(Self::SkipPressed(x)),
            [0xE, _, 0xA, 0x1] => Ok(Self::SkipNotPressed(x)),
            [0xF, _, 0x0, 0x7] => Ok(Self::GetDelayTimer(x)),
            [0xF, _, 0x0, 0xA] => Ok(Self::WaitForKey(x)),
            [0xF, _, 0x1, 0x5] => Ok(Self::SetDelayTimer(x)),
            [0xF, _, 0x1, 0x8] => Ok(Self::SetSoundTimer(x)),
            [0xF, _, 0x1, 0xE] => Ok(Self::AddI(x)),
            [0xF, _, 0x2, 0x9] => Ok(Self::GetSprite(x)),
            [0xF, _, 0x3, 0x3] => Ok(Self::BCD(x)),
            [0xF, _, 0x5, 0x5] => Ok(Self::WriteMultiple(x)),
            [0xF, _, 0x6, 0x5] => Ok(Self::ReadMultiple(x)),
            _ => Err(InstructionDecodeError::InvalidInstruction(data)),
        }
    }

    /// Panics if a `DisplaySprite` has more than fifteen rows.
    pub fn to_data(self) -> RawInstruction {
        use encode::{nnn, xnn, xyn};
        let word = match self {
            Self::ClearScreen => 0x00E0,
            Self::Return => 0x00EE,
            Self::Jump(addr) => nnn(0x1, addr),
            Self::Call(addr) => nnn(0x2, addr),
            Self::SkipIfEqual(x, byte) => xnn(0x3, x, byte),
            Self::SkipNotEqual(x, byte) => xnn(0x4, x, byte),
            Self::SkipRegistersEqual(x, y) => xyn(0x5, x, y, 0x0),
            Self::LoadRegByte(x, byte) => xnn(0x6, x, byte),
            Self::Add(x, byte) => xnn(0x7, x, byte),
            Self::CopyRegToReg { x, y } => xyn(0x8, x, y, 0x0),
            Self::Or { x, y } => xyn(0x8, x, y, 0x1),
            Self::And { x, y } => xyn(0x8, x, y, 0x2),
            Self::Xor { x, y } => xyn(0x8, x, y, 0x3),
            Self::AddReg { x, y } => xyn(0x8, x, y, 0x4),
            Self::Sub { x, y } => xyn(0x8, x, y, 0x5),
            Self::Shr(x) => xyn(0x8, x, VX::V0, 0x6),
            Self::SubN { x, y } => xyn(0x8, x, y, 0x7),
            Self::Shl(x) => xyn(0x8, x, VX::V0, 0xE),
            Self::SkipRegistersNotEqual(x, y) => xyn(0x9, x, y, 0x0),
            Self::LoadImmediate(addr) => nnn(0xA, addr),
            Self::JumpRelative(addr) => nnn(0xB, addr),
            Self::Random(x, mask) => xnn(0xC, x, mask),
            Self::DisplaySprite {
                x,
                y,
                number_of_bytes,
            } => xyn(0xD, x, y, number_of_bytes),
            Self::SkipPressed(x) => xnn(0xE, x, 0x9E),
            Self::SkipNotPressed(x) => xnn(0xE, x, 0xA1),
            Self::GetDelayTimer(x) => xnn(0xF, x, 0x07),
            Self::WaitForKey(x) => xnn(0xF, x, 0x0A),
            Self::SetDelayTimer(x) => xnn(0xF, x, 0x15),
            Self::SetSoundTimer(x) => xnn(0xF, x, 0x18),
            Self::AddI(x) => xnn(0xF, x, 0x1E),
            Self::GetSprite(x) => xnn(0xF, x, 0x29),
            Self::BCD(x) => xnn(0xF, x, 0x33),
            Self::WriteMultiple(x) => xnn(0xF, x, 0x55),
            Self::ReadMultiple(x) => xnn(0xF, x, 0x65),
        };
        RawInstruction::from(word)
    }
}

/// Builds instruction words field by field: the top nibble is always the family.
mod encode {
    use crate::{Address, GeneralRegister};

    fn family(op: u16) -> u16 {
        debug_assert!(op <= 0xF);
        op << 12
    }

    fn register_at(reg: GeneralRegister, shift: u16) -> u16 {
        (reg.index() as u16) << shift
    }

    pub(super) fn nnn(op: u16, addr: Address) -> u16 {
        family(op) | addr.as_u16()
    }

    pub(super) fn xnn(op: u16, x: GeneralRegister, nn: u8) -> u16 {
        family(op) | register_at(x, 8) | nn as u16
    }

    pub(super) fn xyn(op: u16, x: GeneralRegister, y: GeneralRegister, n: u8) -> u16 {
        assert!(n <= 0xF, "{:X} does not fit in the last nibble", n);
        family(op) | register_at(x, 8) | register_at(y, 4) | n as u16
    }
}

/// An undecoded instruction word, high byte first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawInstruction([Datum; 2]);

impl RawInstruction {
    pub fn as_nibbles(&self) -> [Nibble; 4] {
        let ([n1, n2], [n3, n4]) = (self.0[0].as_nibbles(), self.0[1].as_nibbles());
        [n1, n2, n3, n4]
    }

    pub fn first(&self) -> Datum {
        self.0[0]
    }

    pub fn second(&self) -> Datum {
        self.0[1]
    }

    pub fn as_u16(&self) -> u16 {
        u16::from_be_bytes(self.to_bytes())
    }

    pub fn to_bytes(self) -> [u8; 2] {
        self.0.map(Datum::inner)
    }
}

impl From<u16> for RawInstruction {
    fn from(word: u16) -> Self {
        Self(word.to_be_bytes().map(Datum))
    }
}

impl From<(Datum, Datum)> for RawInstruction {
    fn from((high, low): (Datum, Datum)) -> Self {
        Self([high, low])
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum InstructionDecodeError {
    #[error("No instruction is encoded by {:04X}", .0.as_u16())]
    InvalidInstruction(RawInstruction),
}

impl InstructionDecodeError {
    pub fn invalid_data(self) -> RawInstruction {
        let Self::InvalidInstruction(word) = self;
        word
    }
}
