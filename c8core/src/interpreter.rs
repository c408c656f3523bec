use crate::control::{InterpreterState, TickReport};
use crate::display::Display;
use crate::error::{ExecutionError, LoadError, OpcodeFault};
use crate::key::Keys;
use crate::memory::Memory;
use crate::sound::{Buzzer, Silent};
use crate::stack::CallStack;
use crate::{Address, Datum, GeneralRegister, Instruction};
use getset::{CopyGetters, Getters};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use tap::prelude::*;

mod execute;
#[cfg(test)]
mod tests;

/// A complete CHIP-8 machine.
///
/// A host drives it by forwarding key events to [`Chip8::key_press`] and
/// [`Chip8::key_release`], calling [`Chip8::tick`] at whatever rate it likes,
/// and drawing [`Chip8::display`] between ticks. The delay and sound timers
/// count down once per tick.
///
/// Nothing here is synchronised; a host that ticks on one thread and renders
/// or feeds keys from another must serialise those calls itself.
#[derive(Getters, CopyGetters)]
pub struct Chip8 {
    #[getset(get = "pub")]
    memory: Memory,
    #[getset(get = "pub")]
    display: Display,
    #[getset(get_copy = "pub")]
    program_counter: u16,
    #[getset(get = "pub")]
    registers: [Datum; 16],
    /// `I`. Only its low twelve bits are used to address memory.
    #[getset(get_copy = "pub")]
    index: u16,
    #[getset(get = "pub")]
    stack: CallStack,
    #[getset(get_copy = "pub")]
    delay_timer: Datum,
    #[getset(get_copy = "pub")]
    sound_timer: Datum,
    #[getset(get_copy = "pub")]
    keys: Keys,
    #[getset(get_copy = "pub")]
    state: InterpreterState,
    buzzer: Box<dyn Buzzer>,
    rng: StdRng,
}

impl Chip8 {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose random numbers are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            memory: Memory::new(),
            display: Display::blank(),
            program_counter: Address::PROGRAM_START.as_u16(),
            registers: [Datum(0); 16],
            index: 0,
            stack: CallStack::new(),
            delay_timer: Datum(0),
            sound_timer: Datum(0),
            keys: Keys::NONE,
            state: InterpreterState::Normal,
            buzzer: Box::new(Silent),
            rng,
        }
    }

    /// Places a program image at `0x200`. Memory is untouched if the image is too large.
    pub fn load_program(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        self.memory
            .load_program(bytes)
            .tap_ok(|_| info!("Loaded {} byte program.", bytes.len()))
            .tap_err(|e| warn!("{}", e))
    }

    /// Registers the sound sink, replacing any previous one.
    pub fn on_sound(&mut self, buzzer: impl Buzzer + 'static) {
        self.buzzer = Box::new(buzzer);
    }

    /// Runs one instruction and then counts the timers down.
    ///
    /// While waiting for a key this does nothing at all. On error nothing has
    /// been changed, and the program counter still points at the culprit.
    pub fn tick(&mut self) -> Result<TickReport, ExecutionError> {
        trace!("Beginning tick.");
        if let InterpreterState::WaitForKey(register) = self.state {
            trace!("Waiting for a key for {:?}.", register);
            return Ok(TickReport::waiting(register));
        }

        let pc = self.program_counter;
        let raw = self.memory.fetch(pc).tap_err(|e| warn!("{}", e))?;
        trace!("Fetched {:04X} from {:03X}.", raw.as_u16(), pc);
        let instruction = Instruction::try_from_data(raw)
            .map_err(|e| OpcodeFault::new(e.invalid_data().as_u16(), pc))
            .tap_err(|fault| warn!("{}", fault))?;
        debug!("{:03X}: {:?}", pc, instruction);

        let mut report = TickReport::empty();
        self.execute(instruction, &mut report)
            .tap_err(|e| warn!("{}", e))?;
        report.execute();

        if self.timer_tick() {
            report.buzz();
        }
        trace!("Tick complete!");
        Ok(report)
    }

    /// Presses a key, completing a pending `Fx0A` if there is one.
    ///
    /// Panics if `key` is not on the keypad.
    pub fn key_press(&mut self, key: u8) {
        debug!("Key {:X} pressed.", key);
        self.keys.press(key);
        if let InterpreterState::WaitForKey(register) = self.state {
            info!("Key {:X} stored in {:?}, resuming.", key, register);
            self.set_register(register, Datum(key));
            self.increment_program_counter();
            self.state = InterpreterState::Normal;
        }
    }

    /// Panics if `key` is not on the keypad.
    pub fn key_release(&mut self, key: u8) {
        debug!("Key {:X} released.", key);
        self.keys.release(key);
    }

    pub fn register(&self, register: GeneralRegister) -> Datum {
        self.registers[register.index()]
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.state, InterpreterState::WaitForKey(_))
    }

    /// Returns whether the buzzer was sounded.
    fn timer_tick(&mut self) -> bool {
        self.delay_timer.towards_zero();
        let buzz = self.sound_timer == Datum(1);
        if buzz {
            info!("Sound timer expiring, sounding buzzer.");
            self.buzzer.play();
        }
        self.sound_timer.towards_zero();
        buzz
    }

    fn set_register(&mut self, register: GeneralRegister, datum: Datum) {
        self.registers[register.index()] = datum;
    }

    fn set_flag(&mut self, flag: bool) {
        self.set_register(GeneralRegister::FLAG, Datum::from(flag));
    }

    fn increment_program_counter(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    fn skip_if(&mut self, condition: bool) {
        self.increment_program_counter();
        if condition {
            self.increment_program_counter();
        }
    }

    fn set_program_counter(&mut self, to: u16) {
        self.program_counter = to;
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Chip8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chip8")
            .field("program_counter", &format_args!("{:03X}", self.program_counter))
            .field("registers", &self.registers)
            .field("index", &format_args!("{:03X}", self.index))
            .field("stack", &self.stack)
            .field("delay_timer", &self.delay_timer)
            .field("sound_timer", &self.sound_timer)
            .field("keys", &self.keys)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
