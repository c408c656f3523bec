use super::Chip8;
use crate::control::{InterpreterState, TickReport};
use crate::error::ExecutionError;
use crate::memory::glyph_address;
use crate::{Address, Datum, GeneralRegister, Instruction};
use log::{debug, info};
use rand::Rng;

impl Chip8 {
    /// Applies one decoded instruction. Fallible steps run before anything is written.
    pub(super) fn execute(
        &mut self,
        instruction: Instruction,
        report: &mut TickReport,
    ) -> Result<(), ExecutionError> {
        let pc = self.program_counter;
        match instruction {
            Instruction::ClearScreen => {
                self.display.clear();
                report.modify_screen();
                self.increment_program_counter();
            }
            Instruction::Return => {
                let call_site = self.stack.pop().map_err(|e| e.at(pc))?;
                self.set_program_counter(call_site.as_u16());
                self.increment_program_counter();
            }
            Instruction::Jump(addr) => self.set_program_counter(addr.as_u16()),
            Instruction::Call(addr) => {
                self.stack
                    .push(Address::wrapping(pc))
                    .map_err(|e| e.at(pc))?;
                self.set_program_counter(addr.as_u16());
            }
            Instruction::SkipIfEqual(x, byte) => self.skip_if(self.register(x) == Datum(byte)),
            Instruction::SkipNotEqual(x, byte) => self.skip_if(self.register(x) != Datum(byte)),
            Instruction::SkipRegistersEqual(x, y) => {
                self.skip_if(self.register(x) == self.register(y))
            }
            Instruction::LoadRegByte(x, byte) => {
                self.set_register(x, Datum(byte));
                self.increment_program_counter();
            }
            Instruction::Add(x, byte) => {
                self.set_register(x, self.register(x).wrapping_add(byte));
                self.increment_program_counter();
            }
            Instruction::CopyRegToReg { x, y } => self.alu(x, self.register(y)),
            Instruction::Or { x, y } => self.alu(x, self.register(x) | self.register(y)),
            Instruction::And { x, y } => self.alu(x, self.register(x) & self.register(y)),
            Instruction::Xor { x, y } => self.alu(x, self.register(x) ^ self.register(y)),
            Instruction::AddReg { x, y } => {
                let (sum, carry) = self.register(x).carrying_add(self.register(y));
                self.alu_with_flag(x, sum, carry);
            }
            Instruction::Sub { x, y } => {
                let (difference, no_borrow) = self.register(x).sub_no_borrow(self.register(y));
                self.alu_with_flag(x, difference, no_borrow);
            }
            Instruction::Shr(x) => {
                let (shifted, lsb) = self.register(x).shift_right();
                self.alu_with_flag(x, shifted, lsb);
            }
            Instruction::SubN { x, y } => {
                let (difference, no_borrow) = self.register(y).sub_no_borrow(self.register(x));
                self.alu_with_flag(x, difference, no_borrow);
            }
            Instruction::Shl(x) => {
                let (shifted, msb) = self.register(x).shift_left();
                self.alu_with_flag(x, shifted, msb);
            }
            Instruction::SkipRegistersNotEqual(x, y) => {
                self.skip_if(self.register(x) != self.register(y))
            }
            Instruction::LoadImmediate(addr) => {
                self.index = addr.as_u16();
                self.increment_program_counter();
            }
            Instruction::JumpRelative(addr) => {
                let offset = self.register(GeneralRegister::V0).inner() as u16;
                self.set_program_counter(addr.as_u16() + offset);
            }
            Instruction::Random(x, mask) => {
                let random: u8 = self.rng.gen();
                self.set_register(x, Datum(random) & mask);
                self.increment_program_counter();
            }
            Instruction::DisplaySprite {
                x,
                y,
                number_of_bytes,
            } => {
                let rows = self.memory.substring(self.index_address(), number_of_bytes);
                let (at_x, at_y) = (self.register(x), self.register(y));
                let modified = self.display.sprite(at_x, at_y, &rows);
                self.set_flag(modified.collided());
                report.modify_screen();
                self.increment_program_counter();
            }
            Instruction::SkipPressed(x) => self.skip_if(self.keys.holds(self.register(x))),
            Instruction::SkipNotPressed(x) => self.skip_if(!self.keys.holds(self.register(x))),
            Instruction::GetDelayTimer(x) => {
                self.set_register(x, self.delay_timer);
                self.increment_program_counter();
            }
            Instruction::WaitForKey(x) => {
                info!("Waiting for a key press to store in {:?}.", x);
                self.state = InterpreterState::WaitForKey(x);
                report.wait_for_key_on(x);
            }
            Instruction::SetDelayTimer(x) => {
                self.delay_timer = self.register(x);
                self.increment_program_counter();
            }
            Instruction::SetSoundTimer(x) => {
                self.sound_timer = self.register(x);
                self.increment_program_counter();
            }
            Instruction::AddI(x) => {
                let sum = self.index.wrapping_add(self.register(x).inner() as u16);
                self.set_flag(sum > Address::MAX.as_u16());
                self.index = sum;
                self.increment_program_counter();
            }
            Instruction::GetSprite(x) => {
                self.index = glyph_address(self.register(x));
                self.increment_program_counter();
            }
            Instruction::BCD(x) => {
                let base = self.index_address();
                for (offset, digit) in (0..).zip(self.register(x).bcd()) {
                    self.memory[base.offset(offset)] = digit;
                }
                self.increment_program_counter();
            }
            Instruction::WriteMultiple(x) => {
                let base = self.index_address();
                for (offset, reg) in (0..).zip(x.through()) {
                    self.memory[base.offset(offset)] = self.register(reg);
                }
                debug!("Stored V0..={:?} at {:03X}.", x, base);
                self.increment_program_counter();
            }
            Instruction::ReadMultiple(x) => {
                let base = self.index_address();
                for (offset, reg) in (0..).zip(x.through()) {
                    self.set_register(reg, self.memory[base.offset(offset)]);
                }
                debug!("Loaded V0..={:?} from {:03X}.", x, base);
                self.increment_program_counter();
            }
        }
        Ok(())
    }

    fn index_address(&self) -> Address {
        Address::wrapping(self.index)
    }

    fn alu(&mut self, x: GeneralRegister, result: Datum) {
        self.set_register(x, result);
        self.increment_program_counter();
    }

    /// The flag is written first, so an instruction targeting `VF` keeps its result.
    fn alu_with_flag(&mut self, x: GeneralRegister, result: Datum, flag: bool) {
        self.set_flag(flag);
        self.alu(x, result);
    }
}
